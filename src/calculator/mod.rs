//! Four-function arithmetic behind `GET /calculate`.
//!
//! Parsing and evaluation are pure; the HTTP handler only maps
//! [`CalcError`] onto a 400 response.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::core::errors::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = CalcError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "add" => Ok(Operation::Add),
            "subtract" => Ok(Operation::Subtract),
            "multiply" => Ok(Operation::Multiply),
            "divide" => Ok(Operation::Divide),
            _ => Err(CalcError::UnsupportedOperation),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("Please provide operation, num1 and num2 parameters")]
    Validation,
    #[error("Invalid operation. Use add, subtract, multiply, divide")]
    UnsupportedOperation,
    #[error("Cannot divide by zero")]
    DivisionByZero,
}

impl From<CalcError> for ApiError {
    fn from(err: CalcError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalculationRequest {
    pub operation: Operation,
    pub num1: f64,
    pub num2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationResult {
    pub operation: Operation,
    pub num1: f64,
    pub num2: f64,
    pub result: f64,
}

/// Builds a request from raw query parameters.
///
/// Presence and numeric parsing are checked before the operation name, so a
/// bogus operation with a missing operand is still a validation error.
pub fn parse_request(params: &HashMap<String, String>) -> Result<CalculationRequest, CalcError> {
    let operation = params
        .get("operation")
        .map(String::as_str)
        .filter(|op| !op.is_empty());
    let num1 = params.get("num1").and_then(|raw| parse_number(raw));
    let num2 = params.get("num2").and_then(|raw| parse_number(raw));

    let (Some(operation), Some(num1), Some(num2)) = (operation, num1, num2) else {
        return Err(CalcError::Validation);
    };

    Ok(CalculationRequest {
        operation: operation.parse()?,
        num1,
        num2,
    })
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

pub fn calculate(request: &CalculationRequest) -> Result<CalculationResult, CalcError> {
    let CalculationRequest {
        operation,
        num1,
        num2,
    } = *request;

    let result = match operation {
        Operation::Add => num1 + num2,
        Operation::Subtract => num1 - num2,
        Operation::Multiply => num1 * num2,
        Operation::Divide => {
            // -0.0 == 0.0 as well
            if num2 == 0.0 {
                return Err(CalcError::DivisionByZero);
            }
            num1 / num2
        }
    };

    Ok(CalculationResult {
        operation,
        num1,
        num2,
        result,
    })
}
