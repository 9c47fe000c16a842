use super::ui;
use crate::core::loader::read_records;
use crate::core::{CurrencyStats, StatsEngine};
use anyhow::{Context, Result};
use comfy_table::Cell;
use std::path::Path;
use tracing::info;

impl CurrencyStats {
    /// Renders min/max, oldest/newest prices as a two-column table.
    pub fn display_as_table(&self) -> String {
        let code = self.currency_code.as_deref().unwrap_or("N/A");

        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Statistic"), ui::header_cell("Value")]);

        let price_rows = [
            ("Min price", self.min_price),
            ("Max price", self.max_price),
            ("Oldest price", self.oldest_price),
            ("Newest price", self.newest_price),
        ];
        for (label, value) in price_rows {
            table.add_row(vec![Cell::new(label), ui::optional_cell(value, |p| p.to_string())]);
        }
        table.add_row(vec![
            Cell::new("Oldest record"),
            ui::optional_cell(self.oldest_date_time.clone(), |s| s),
        ]);
        table.add_row(vec![
            Cell::new("Newest record"),
            ui::optional_cell(self.newest_date_time.clone(), |s| s),
        ]);

        let mut output = format!(
            "Currency: {}\n\n",
            ui::style_text(code, ui::StyleType::Title)
        );
        output.push_str(&table.to_string());
        output
    }
}

/// Renders currencies in the given order with their normalized ranges.
pub fn display_ranking(stats: &[CurrencyStats]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Currency"),
        ui::header_cell("Normalized Range"),
    ]);

    for (i, entry) in stats.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(entry.currency_code.as_deref().unwrap_or("N/A")),
            ui::optional_cell(entry.normalized_range, |r| r.to_string()),
        ]);
    }

    table.to_string()
}

pub async fn run_stats(engine: &StatsEngine, currency_code: &str) -> Result<()> {
    let stats = engine.stats_for_currency(currency_code).await?;
    println!("{}", stats.display_as_table());
    Ok(())
}

pub async fn run_normalized(engine: &StatsEngine) -> Result<()> {
    let stats = engine.all_currencies_by_normalized_range().await?;
    println!(
        "{}\n\n{}",
        ui::style_text("Normalized range, highest first", ui::StyleType::Title),
        display_ranking(&stats)
    );
    Ok(())
}

pub async fn run_highest(engine: &StatsEngine, day: u32, month: u32, year: i32) -> Result<()> {
    let date = format!("{day:02}-{month:02}-{year}");
    match engine
        .highest_normalized_range_on_date(day, month, year)
        .await?
    {
        Some(stats) => {
            let code = stats.currency_code.as_deref().unwrap_or("N/A");
            let range = stats
                .normalized_range
                .map_or("N/A".to_string(), |r| r.to_string());
            println!(
                "Highest normalized range on {}: {} ({})",
                date,
                ui::style_text(code, ui::StyleType::Highlight),
                range
            );
        }
        None => println!(
            "{}",
            ui::style_text(&format!("No price data on {date}"), ui::StyleType::Subtle)
        ),
    }
    Ok(())
}

/// Reads a `timestamp,currencyCode,price` file and adds its records.
pub async fn run_import(engine: &StatsEngine, file: &Path) -> Result<()> {
    let records = read_records(file)?;
    let count = records.len();
    engine
        .add_new_data(records)
        .await
        .with_context(|| format!("Failed to import {}", file.display()))?;

    info!("Imported {} records from {}", count, file.display());
    println!(
        "Imported {} records from {}",
        ui::style_text(&count.to_string(), ui::StyleType::Highlight),
        file.display()
    );
    Ok(())
}
