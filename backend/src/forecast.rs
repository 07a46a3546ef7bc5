//! Cash flow forecasts.
//!
//! The model gets an analyst prompt built from the ledger and may call four
//! ledger tools once before writing the forecast:
//!
//! | Tool                         | Input                          |
//! |------------------------------|--------------------------------|
//! | `get_transactions`           | `start_date`, `end_date`       |
//! | `get_balance`                | none                           |
//! | `calculate_monthly_averages` | `months` (default 3)           |
//! | `get_recurring_transactions` | `min_occurrences` (default 2)  |

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::ai::{forecast_prompt, MessageRequest, MessagesApi};
use crate::error::{AiError, ForecastError, ForecastResult};
use crate::ledger::{Ledger, DEFAULT_AVERAGE_MONTHS, DEFAULT_MIN_OCCURRENCES};

/// Horizons the service forecasts, in days
pub const FORECAST_PERIODS: [u32; 3] = [30, 90, 180];

const MAX_TOKENS: u32 = 4000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastMetadata {
    pub forecast_start: String,
    pub forecast_end: String,
    pub current_balance: f64,
    pub forecast_days: u32,
}

/// What the forecast endpoints return for one horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ForecastOutcome {
    Ready {
        forecast_text: String,
        metadata: ForecastMetadata,
    },
    Failed {
        error: String,
    },
}

pub fn is_supported_period(days: u32) -> bool {
    FORECAST_PERIODS.contains(&days)
}

/// Key of a horizon in the all-periods response.
pub fn period_key(days: u32) -> String {
    format!("{}_days", days)
}

/// Tool schemas offered to the model.
pub fn tool_definitions() -> Vec<Value> {
    vec![
        json!({
            "name": "get_transactions",
            "description": "Get filtered transactions from the ledger for analysis",
            "input_schema": {
                "type": "object",
                "properties": {
                    "start_date": { "type": "string", "description": "Start date in YYYY-MM-DD format" },
                    "end_date": { "type": "string", "description": "End date in YYYY-MM-DD format" }
                }
            }
        }),
        json!({
            "name": "get_balance",
            "description": "Get the current balance",
            "input_schema": { "type": "object", "properties": {} }
        }),
        json!({
            "name": "calculate_monthly_averages",
            "description": "Calculate average monthly income and expenses",
            "input_schema": {
                "type": "object",
                "properties": {
                    "months": { "type": "integer", "description": "Number of months to analyze" }
                }
            }
        }),
        json!({
            "name": "get_recurring_transactions",
            "description": "Identify recurring transactions based on description",
            "input_schema": {
                "type": "object",
                "properties": {
                    "min_occurrences": { "type": "integer", "description": "Minimum number of occurrences to consider recurring" }
                }
            }
        }),
    ]
}

fn date_arg(tool: &str, input: &Value, key: &str) -> ForecastResult<Option<NaiveDate>> {
    match input.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| ForecastError::InvalidToolInput {
                tool: tool.to_string(),
                message: format!("{}: {}", key, e),
            }),
        Some(other) => Err(ForecastError::InvalidToolInput {
            tool: tool.to_string(),
            message: format!("{} must be a date string, got {}", key, other),
        }),
    }
}

fn count_arg(tool: &str, input: &Value, key: &str, default: u64) -> ForecastResult<u64> {
    match input.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => value.as_u64().ok_or_else(|| ForecastError::InvalidToolInput {
            tool: tool.to_string(),
            message: format!("{} must be a non-negative integer, got {}", key, value),
        }),
    }
}

/// Run one ledger tool.
pub fn run_tool(ledger: &Ledger, name: &str, input: &Value, today: NaiveDate) -> ForecastResult<Value> {
    let result = match name {
        "get_transactions" => {
            let start = date_arg(name, input, "start_date")?;
            let end = date_arg(name, input, "end_date")?;
            serde_json::to_value(ledger.transactions(start, end))
        }
        "get_balance" => Ok(json!(ledger.balance())),
        "calculate_monthly_averages" => {
            let months = count_arg(name, input, "months", u64::from(DEFAULT_AVERAGE_MONTHS))?;
            let months = u32::try_from(months).unwrap_or(u32::MAX);
            serde_json::to_value(ledger.monthly_averages(months, today))
        }
        "get_recurring_transactions" => {
            let min = count_arg(name, input, "min_occurrences", DEFAULT_MIN_OCCURRENCES as u64)?;
            serde_json::to_value(ledger.recurring(usize::try_from(min).unwrap_or(usize::MAX)))
        }
        other => return Err(ForecastError::UnknownTool(other.to_string())),
    };
    result.map_err(|e| ForecastError::InvalidToolInput {
        tool: name.to_string(),
        message: e.to_string(),
    })
}

/// `tool_result` block for one tool call.
fn tool_result(ledger: &Ledger, id: &str, name: &str, input: &Value, today: NaiveDate) -> Value {
    match run_tool(ledger, name, input, today) {
        Ok(result) => json!({
            "type": "tool_result",
            "tool_use_id": id,
            "content": result.to_string(),
        }),
        Err(e) => {
            tracing::warn!("Tool {} failed: {}", name, e);
            json!({
                "type": "tool_result",
                "tool_use_id": id,
                "content": format!("Error executing tool: {}", e),
                "is_error": true,
            })
        }
    }
}

/// Ask the model for the forecast text, answering one round of tool calls.
async fn generate<M: MessagesApi>(model: &M, ledger: &Ledger, days: u32, today: NaiveDate) -> ForecastResult<String> {
    let end = today + Duration::days(i64::from(days));
    let prompt = forecast_prompt(
        ledger.balance(),
        &ledger.monthly_averages(DEFAULT_AVERAGE_MONTHS, today),
        days,
        end,
    );
    let messages = vec![MessageRequest::user_text(&prompt)];
    let tools = tool_definitions();

    let response = model
        .create_message(MessageRequest::new(MAX_TOKENS, messages.clone()).with_tools(tools.clone()))
        .await?;

    let results: Vec<Value> = response
        .tool_uses()
        .map(|(id, name, input)| {
            tracing::info!("🔧 Model called {}", name);
            tool_result(ledger, id, name, input, today)
        })
        .collect();

    if !response.wants_tools() || results.is_empty() {
        return Ok(response.text());
    }

    let mut follow_up = messages;
    follow_up.push(response.as_assistant_turn());
    follow_up.push(json!({ "role": "user", "content": results }));

    // tool_use blocks in the history require the tools to be declared
    let final_response = model
        .create_message(MessageRequest::new(MAX_TOKENS, follow_up).with_tools(tools))
        .await?;
    Ok(final_response.text())
}

/// Forecast `days` ahead of `today`.
///
/// Never fails: problems are reported as [`ForecastOutcome::Failed`].
pub async fn forecast<M: MessagesApi>(model: Option<&M>, ledger: &Ledger, days: u32, today: NaiveDate) -> ForecastOutcome {
    if !is_supported_period(days) {
        return ForecastOutcome::Failed {
            error: ForecastError::UnsupportedPeriod(days).to_string(),
        };
    }
    let Some(model) = model else {
        return ForecastOutcome::Failed {
            error: AiError::MissingApiKey.to_string(),
        };
    };

    tracing::info!("📈 Forecasting {} days from {}", days, today);
    match generate(model, ledger, days, today).await {
        Ok(forecast_text) => ForecastOutcome::Ready {
            forecast_text,
            metadata: ForecastMetadata {
                forecast_start: today.format("%Y-%m-%d").to_string(),
                forecast_end: (today + Duration::days(i64::from(days))).format("%Y-%m-%d").to_string(),
                current_balance: ledger.balance(),
                forecast_days: days,
            },
        },
        Err(e) => {
            tracing::error!("❌ Forecast failed: {}", e);
            ForecastOutcome::Failed { error: e.to_string() }
        }
    }
}

/// Forecasts for 30, 90 and 180 days, keyed `"30_days"`, ...
pub async fn forecast_periods<M: MessagesApi>(
    model: Option<&M>,
    ledger: &Ledger,
    today: NaiveDate,
) -> BTreeMap<String, ForecastOutcome> {
    let mut outcomes = BTreeMap::new();
    for days in FORECAST_PERIODS {
        outcomes.insert(period_key(days), forecast(model, ledger, days, today).await);
    }
    outcomes
}
