//! Step command implementation.

use super::{Destination, Source};
use pressmigrate_protocol::BatchStepRequest;
use std::error::Error;

/// Runs one batch step and prints the response as JSON.
pub fn run(
    source: &Source,
    dest: &Destination,
    post_type: &str,
    status: &str,
    start_id: u64,
    batch_size: i64,
) -> Result<(), Box<dyn Error>> {
    let request = BatchStepRequest::new(post_type, status, start_id, batch_size);
    let session = dest.session(source, Some(request.normalized().limit))?;

    let response = session.driver.step(&request)?;
    session.save()?;
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}
