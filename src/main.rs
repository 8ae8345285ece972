//! `gtmx` - GTM container export editor.
//!
//! Exit codes: 0 on success, 2 when a lookup found nothing to act on,
//! 1 on any other error.

use gtm_editor::run;
use gtm_lib::GtmError;

fn main() {
    if let Err(e) = run() {
        if e.downcast_ref::<GtmError>().is_some_and(GtmError::is_status) {
            eprintln!("{e}");
            std::process::exit(2);
        }
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
