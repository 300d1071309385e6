//! Split every link in a list, keeping intermediate files and continuing
//! past failures.
//!
//! Usage: cargo run --example options -- links.txt

use std::path::Path;

use chaptersplit::{BatchPolicy, SplitOptions};

#[tokio::main]
async fn main() -> chaptersplit::Result<()> {
    let list = std::env::args()
        .nth(1)
        .expect("usage: options <link-list>");
    let list = Path::new(&list);

    let links = chaptersplit::read_link_list(list)?;
    let opts = SplitOptions::new()
        .output_root(chaptersplit::default_output_root(Some(list)))
        .keep_artifacts(true)
        .max_duplicates(10)
        .batch_policy(BatchPolicy::ContinueOnError);

    let report = chaptersplit::split_with_options(&links, opts).await?;

    println!("{}", report.to_json_pretty()?);
    Ok(())
}
