use clap::Parser;

/// Customer satisfaction dashboard over survey spreadsheet exports.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON dashboard configuration describing the source columns,
    /// the feature schema, the model artifact and the coupon template. Every field has a
    /// default, so a plain --input run works without a configuration.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The survey responses export to load. Overrides the path that may be
    /// specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use. Not needed
    /// for single-worksheet workbooks.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// Process only the most recent response instead of the full table.
    #[clap(long, takes_value = false)]
    pub latest_only: bool,

    /// (file path, 'stdout' or empty) Destination of the predictions export. Defaults
    /// to predictions.csv in the working directory.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or 'stdout') If specified, the JSON summary of the run will be written
    /// to the given location in addition to the console output.
    #[clap(long, value_parser)]
    pub summary: Option<String>,

    /// Attempt a coupon notification to every customer predicted satisfied that has a
    /// contact address. Requires --sender-email and --app-password.
    #[clap(long, takes_value = false)]
    pub send_coupons: bool,

    /// The sender identity handed to the notification transport. No default is provided
    /// on purpose: credentials are supplied per invocation.
    #[clap(long, value_parser)]
    pub sender_email: Option<String>,

    /// The application credential handed to the notification transport. No default is
    /// provided on purpose.
    #[clap(long, value_parser)]
    pub app_password: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
