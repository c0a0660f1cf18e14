/*!

# Quick start

This example shows how to run the dashboard end to end on a survey collected
with an online form tool. Google Forms is used here because it is free and
exports straight to a spreadsheet; Microsoft Forms and Qualtrics work the
same way.

**Collecting responses** Create a form with the survey questions. The
single-choice questions with a fixed set of answers (visit frequency, spend
bracket) and the 1-5 rating questions are the ones used for prediction.
Checkbox questions ("select all that apply") export as one comma-joined cell
per response and feed the descriptive tables only.

**Getting the table** In the form's `Responses` tab, use `Create spreadsheet`
and download the sheet as CSV (or keep the Excel format and pass
`--input-type xlsx`). The first row must be the header. The email column is
found by name (`Email Address` by default) and the `Timestamp` column is
dropped as a non-semantic index.

Run `satdash` on the export:

```bash
satdash --input responses.csv
```

The program prints the latest raw responses, a frequency table per
multi-punch question, the prediction table and a JSON run summary. The
predictions are written to `predictions.csv` (use `--out` to change the
destination, `--out stdout` to print them).

```text
[INFO  survey_pipeline] run_prediction_pipeline: 42 records, 6 feature slots
[INFO  survey_pipeline] run_prediction_pipeline: excluded 3 of 42 records during normalization
[INFO  survey_pipeline] run_prediction_pipeline: 39 predictions, 17 satisfied
```

Records whose answers fall outside the declared enumerations (for example a
visit frequency of `Never`) are excluded from prediction but stay visible in
the raw table.

**Sending coupons** To notify the predicted-satisfied customers, supply the
sender identity and credential on the command line. They are never stored
and have no defaults:

```bash
satdash --input responses.csv --send-coupons \
    --sender-email team@example.com --app-password "$APP_PASSWORD"
```

Each delivery is attempted in order; a failed delivery is reported for that
recipient and the remaining deliveries still run.

**Custom surveys** A different questionnaire or model is described with a
JSON configuration passed through `--config`; see the `satdash --help`
output and the `DashboardConfig` documentation in the binary crate.

*/
