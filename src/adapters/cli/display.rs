//! Console formatting for reports

use chrono::Local;

use crate::domain::{Chain, HolderRecord};

const RULE_WIDTH: usize = 100;
const BALANCE_FRACTION_DIGITS: usize = 4;

pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Report header with the start timestamp
pub fn print_header(mode: &str, contract: &str, chain: Chain) {
    println!("{}", rule());
    println!("Onchain Monitor - {}", mode);
    println!("Started:  {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("Contract: {}", contract);
    println!("Chain:    {}", chain);
    println!("{}", rule());
}

/// Report footer with the completion timestamp
pub fn print_footer() {
    println!("{}", rule());
    println!("Completed: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("{}", rule());
}

/// "$1.234567" or "N/A"
pub fn format_price(price_usd: Option<f64>) -> String {
    match price_usd {
        Some(price) if price >= 1.0 => format!("${:.4}", price),
        Some(price) => format!("${:.8}", price),
        None => "N/A".to_string(),
    }
}

/// Group the integer part with commas and cut the fraction to four digits
pub fn format_balance(balance: &str) -> String {
    let (int_part, frac_part) = match balance.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (balance, ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let frac: String = frac_part.chars().take(BALANCE_FRACTION_DIGITS).collect();
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        grouped
    } else {
        format!("{}.{}", grouped, frac)
    }
}

/// `# | Address | Balance | Label` table
pub fn print_holders_table(holders: &[HolderRecord]) {
    if holders.is_empty() {
        println!("  No holders found");
        return;
    }

    println!("{:<5} {:<44} {:>30}  {}", "#", "Address", "Balance", "Label");
    println!("{}", "-".repeat(RULE_WIDTH));
    for (rank, holder) in holders.iter().enumerate() {
        println!(
            "{:<5} {:<44} {:>30}  {}",
            rank + 1,
            holder.address(),
            format_balance(holder.balance()),
            holder.label()
        );
    }
}
