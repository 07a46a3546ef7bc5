//! Prompts sent to the model.

use chrono::NaiveDate;

use crate::ledger::MonthlyAverages;

/// Instructions for reading a receipt image.
pub fn receipt_prompt() -> &'static str {
    r#"Extract the details of this receipt and return them as JSON with exactly these fields:

{
  "date": "YYYY-MM-DD",
  "currency": "three letter currency code, e.g. USD",
  "vendor_name": "name of the store or vendor",
  "receipt_items": [
    { "item_name": "name of the item", "item_cost": 0.0 }
  ],
  "tax": 0.0,
  "total": 0.0
}

Rules:
1. Costs, tax and total are numbers, not strings
2. Use 0 for tax when the receipt shows none
3. If the date is unreadable, use null
4. Return ONLY the JSON object, no explanations"#
}

/// Analyst prompt for a `days`-long forecast ending on `forecast_end`.
pub fn forecast_prompt(balance: f64, averages: &MonthlyAverages, days: u32, forecast_end: NaiveDate) -> String {
    format!(
        r#"You are a financial analyst agent tasked with forecasting cash flow.

Current Information:
- Current Balance: ${balance:.2}
- Average Monthly Income: ${income:.2}
- Average Monthly Expenses: ${expenses:.2}
- Net Monthly Cash Flow: ${net:.2}

Forecasting Task:
Forecast the cash flow for the next {days} days (until {end}).

Consider:
1. Recurring transactions identified from historical data
2. Expected changes in income or expenses
3. Seasonal variations if applicable

Generate a day-by-day forecast showing:
- Date
- Expected income
- Expected expenses
- Net daily cash flow
- Running balance

Then provide:
1. A summary of total expected income over this period
2. Total expected expenses
3. Net cash flow
4. Final projected balance
5. Key insights about the forecasted period

Use the available tools to analyze transaction history and identify patterns."#,
        balance = balance,
        income = averages.avg_monthly_income,
        expenses = averages.avg_monthly_expenses,
        net = averages.avg_monthly_net,
        days = days,
        end = forecast_end.format("%Y-%m-%d"),
    )
}
