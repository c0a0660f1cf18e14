// Coupon delivery over a pluggable transport.
//
// The transport is the external collaborator: the dashboard hands it the
// caller-supplied sender identity and credential plus one message at a time.
// Deliveries run sequentially in record order and one failure never stops
// the rest.

use log::{info, warn};

use survey_pipeline::CouponMessage;

pub trait NotificationTransport {
    fn deliver(
        &self,
        sender: &str,
        credential: &str,
        message: &CouponMessage,
    ) -> Result<(), String>;
}

/// Reports every would-be delivery on the console instead of talking to a
/// mail server. The default transport of the command line tool.
pub struct ConsoleTransport;

impl NotificationTransport for ConsoleTransport {
    fn deliver(
        &self,
        sender: &str,
        _credential: &str,
        message: &CouponMessage,
    ) -> Result<(), String> {
        println!(
            "[coupon] from {} to {}: {}",
            sender, message.recipient, message.subject
        );
        Ok(())
    }
}

/// Attempts every delivery and reports (delivered, failed) counts.
pub fn deliver_coupons(
    transport: &dyn NotificationTransport,
    sender: &str,
    credential: &str,
    targets: &[CouponMessage],
) -> (usize, usize) {
    let mut delivered: usize = 0;
    let mut failed: usize = 0;
    for message in targets.iter() {
        match transport.deliver(sender, credential, message) {
            Ok(()) => {
                info!("deliver_coupons: sent to {}", message.recipient);
                delivered += 1;
            }
            Err(e) => {
                warn!("deliver_coupons: failed for {}: {}", message.recipient, e);
                failed += 1;
            }
        }
    }
    info!(
        "deliver_coupons: {} delivered, {} failed out of {} targets",
        delivered,
        failed,
        targets.len()
    );
    (delivered, failed)
}
