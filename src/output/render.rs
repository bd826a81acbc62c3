//! Plain-text rendering of a finished search for the CLI

use crate::events::SearchOutcome;

/// Prints the final result set and statistics to stdout
pub fn print_outcome(outcome: &SearchOutcome) {
    println!("=== Closed Auction Results ===\n");
    println!("Records: {}", outcome.total_count);

    if let Some(stats) = &outcome.statistics {
        println!("Average price: {}", stats.average);
        println!("Max price:     {}", stats.max);
        println!("Min price:     {}", stats.min);
    }

    if outcome.items.is_empty() {
        println!("\nNo closed sales matched the search.");
        return;
    }

    println!();
    for item in &outcome.items {
        let title = if item.title.is_empty() {
            "(untitled)"
        } else {
            &item.title
        };
        println!("  {:>8}  {}  {}", item.price, item.end_time, title);
        println!("            {}", item.url);
    }
}
