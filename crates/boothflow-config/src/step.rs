use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of step a node renders as.
///
/// The built-in tags cover the stock booth steps. Any other tag is kept as
/// [`StepType::Custom`] so host applications can register renderers for
/// their own step kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StepType {
  Idle,
  Countdown,
  Capture,
  Selection,
  Result,
  Generic,
  Custom(String),
}

impl StepType {
  /// The canonical tag for this step type.
  pub fn as_str(&self) -> &str {
    match self {
      StepType::Idle => "idle",
      StepType::Countdown => "countdown",
      StepType::Capture => "capture",
      StepType::Selection => "selection",
      StepType::Result => "result",
      StepType::Generic => "generic",
      StepType::Custom(tag) => tag,
    }
  }

  pub fn is_custom(&self) -> bool {
    matches!(self, StepType::Custom(_))
  }
}

impl From<&str> for StepType {
  fn from(tag: &str) -> Self {
    match tag {
      "idle" | "trigger" => StepType::Idle,
      "countdown" => StepType::Countdown,
      "capture" => StepType::Capture,
      "selection" => StepType::Selection,
      "result" | "share" => StepType::Result,
      "generic" | "passthrough" => StepType::Generic,
      other => StepType::Custom(other.to_string()),
    }
  }
}

impl From<String> for StepType {
  fn from(tag: String) -> Self {
    StepType::from(tag.as_str())
  }
}

impl From<StepType> for String {
  fn from(step_type: StepType) -> Self {
    match step_type {
      StepType::Custom(tag) => tag,
      other => other.as_str().to_string(),
    }
  }
}

impl fmt::Display for StepType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_aliases_map_to_builtin_tags() {
    assert_eq!(StepType::from("trigger"), StepType::Idle);
    assert_eq!(StepType::from("share"), StepType::Result);
    assert_eq!(StepType::from("passthrough"), StepType::Generic);
  }

  #[test]
  fn test_unknown_tag_is_custom() {
    let step = StepType::from("gif-burst");
    assert_eq!(step, StepType::Custom("gif-burst".to_string()));
    assert!(step.is_custom());
    assert_eq!(step.to_string(), "gif-burst");
  }

  #[test]
  fn test_serializes_as_plain_string() {
    let json = serde_json::to_string(&StepType::Capture).unwrap();
    assert_eq!(json, "\"capture\"");

    let parsed: StepType = serde_json::from_str("\"share\"").unwrap();
    assert_eq!(parsed, StepType::Result);
    assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"result\"");
  }
}
