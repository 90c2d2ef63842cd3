//! # wo-stamp CLI
//!
//! Command-line front end for work order capture.
//!
//! ## Usage
//! ```bash
//! wo-stamp submit --order 12345 --technician "Luis Boada" site-1.jpg site-2.jpg
//! wo-stamp stamp site-1.jpg --out stamped/ --lat -33.45 --lng -70.66
//! wo-stamp roster
//! ```

mod cli;

use work_order_stamp::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    cli::run().await
}
