//! Per-hunter observation and decision exchanged with decision providers.
//!
//! An [`Observation`] is what a hunter sees at the start of a tick; a
//! [`Decision`] is what it answers. Both serialize to JSON so that an
//! out-of-process provider can be plugged in behind
//! [`ExternalPolicy`](crate::policy::ExternalPolicy).

use log::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::environment::Snapshot;
use crate::grid::Position;
use crate::types::Action;

/// What one hunter observes at the start of a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Observation {
    pub self_position: Position,
    /// Every other hunter, in hunter-index order.
    pub other_positions: Vec<Position>,
    pub prey_positions: Vec<Position>,
    pub prey_captured: Vec<bool>,
}

impl Observation {
    /// Builds hunter `index`'s view of `snapshot`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a hunter of the snapshot.
    pub fn for_hunter(snapshot: &Snapshot, index: usize) -> Self {
        let self_position = snapshot.hunters[index];
        let other_positions = snapshot
            .hunters
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, p)| *p)
            .collect();
        Self {
            self_position,
            other_positions,
            prey_positions: snapshot.prey.clone(),
            prey_captured: snapshot.captured.clone(),
        }
    }

    /// The partner hunter in a two-hunter game.
    pub fn partner(&self) -> Option<Position> {
        self.other_positions.first().copied()
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A hunter's answer for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Decision {
    pub action: Action,
    /// Index of the prey being pursued, if the provider declares one.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub target: Option<usize>,
    /// Which prey this hunter believes its partner is pursuing.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub estimated_other_target: Option<usize>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub rationale: Option<String>,
}

impl Decision {
    /// A bare action with no declared target.
    pub fn action(action: Action) -> Self {
        Self {
            action,
            target: None,
            estimated_other_target: None,
            rationale: None,
        }
    }

    /// The safe default.
    pub fn stay() -> Self {
        Self::action(Action::Stay)
    }

    pub fn with_target(mut self, target: usize) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    /// Parses a provider response, never failing.
    ///
    /// Accepts a JSON object (optionally wrapped in a code fence or prose)
    /// with an `action` field, or a bare action name. Anything that does
    /// not yield an action becomes [`Decision::stay`] and is logged.
    pub fn parse(response: &str) -> Self {
        match Self::try_parse(response) {
            Some(decision) => decision,
            None => {
                warn!("unparseable decision {:?}; falling back to STAY", truncate(response, 120));
                Self::stay().with_rationale("fallback: unparseable response")
            }
        }
    }

    fn try_parse(response: &str) -> Option<Self> {
        // A reply that carries a JSON object is judged by that object alone.
        #[cfg(feature = "serde")]
        {
            if let Some(decision) = parse_json_object(response) {
                return decision;
            }
        }
        let trimmed = response.trim();
        if let Ok(action) = trimmed.parse::<Action>() {
            return Some(Self::action(action));
        }
        // Last resort: the first word that names an action.
        trimmed
            .split(|c: char| !c.is_ascii_alphabetic())
            .find_map(|word| word.parse::<Action>().ok())
            .map(Self::action)
    }
}

/// `None` when `response` holds no JSON object; `Some(None)` when it holds
/// one that does not name a valid action.
#[cfg(feature = "serde")]
fn parse_json_object(response: &str) -> Option<Option<Decision>> {
    use serde_json::Value;

    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end < start {
        return None;
    }
    let value: Value = serde_json::from_str(&response[start..=end]).ok()?;
    let object = value.as_object()?;
    Some(decision_from_object(object))
}

#[cfg(feature = "serde")]
fn decision_from_object(object: &serde_json::Map<String, serde_json::Value>) -> Option<Decision> {
    use serde_json::Value;

    let field = |names: &[&str]| {
        object
            .iter()
            .find(|(k, _)| names.iter().any(|n| k.eq_ignore_ascii_case(n)))
            .map(|(_, v)| v)
    };

    let action = field(&["action", "next_action", "move"])?
        .as_str()?
        .parse::<Action>()
        .ok()?;
    let target = field(&["target", "target_prey"]).and_then(parse_target);
    let rationale = field(&["rationale", "reason"])
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(Decision {
        action,
        target,
        estimated_other_target: None,
        rationale,
    })
}

/// Integers are zero-based indices; `"prey1"` / `"A"` style names are one-based.
#[cfg(feature = "serde")]
fn parse_target(value: &serde_json::Value) -> Option<usize> {
    if let Some(n) = value.as_u64() {
        return usize::try_from(n).ok();
    }
    let s = value.as_str()?.trim().to_ascii_lowercase();
    let name = s.strip_prefix("prey").unwrap_or(&s).trim();
    if let Ok(n) = name.parse::<usize>() {
        return n.checked_sub(1);
    }
    match name.as_bytes() {
        [c @ b'a'..=b'z'] => Some(usize::from(c - b'a')),
        _ => None,
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        Snapshot {
            episode: 0,
            time_step: 3,
            hunters: vec![Position::new(1, 1), Position::new(2, 2)],
            prey: vec![Position::new(5, 5), Position::new(6, 6)],
            captured: vec![false, true],
        }
    }

    #[test]
    fn observation_splits_self_and_others() {
        let obs = Observation::for_hunter(&snapshot(), 1);
        assert_eq!(obs.self_position, Position::new(2, 2));
        assert_eq!(obs.other_positions, vec![Position::new(1, 1)]);
        assert_eq!(obs.partner(), Some(Position::new(1, 1)));
        assert_eq!(obs.prey_captured, vec![false, true]);
    }

    #[test]
    fn bare_names_parse() {
        assert_eq!(Decision::parse("up").action, Action::Up);
        assert_eq!(Decision::parse("  NONE ").action, Action::Stay);
        assert_eq!(Decision::parse("I will go Left now").action, Action::Left);
    }

    #[test]
    fn garbage_falls_back_to_stay() {
        let d = Decision::parse("???");
        assert_eq!(d.action, Action::Stay);
        assert!(d.rationale.is_some());
        assert_eq!(Decision::parse("").action, Action::Stay);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_decision_parses() {
        let d = Decision::parse(r#"{"action": "right", "target": "prey2", "reason": "closer"}"#);
        assert_eq!(d.action, Action::Right);
        assert_eq!(d.target, Some(1));
        assert_eq!(d.rationale.as_deref(), Some("closer"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn fenced_json_parses() {
        let d = Decision::parse("```json\n{\"Action\": \"DOWN\", \"target\": 0}\n```");
        assert_eq!(d.action, Action::Down);
        assert_eq!(d.target, Some(0));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_with_unknown_action_falls_back() {
        let d = Decision::parse(r#"{"action": "jump"}"#);
        // "action" is itself not an action name, and neither is "jump".
        assert_eq!(d.action, Action::Stay);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn invalid_json_action_ignores_prose_in_fields() {
        let d = Decision::parse(r#"{"action": "ATTACK", "rationale": "the prey is up ahead"}"#);
        assert_eq!(d.action, Action::Stay);
        assert_eq!(d.target, None);

        let d = Decision::parse(r#"Moving right. {"target": 1, "reason": "go left"}"#);
        assert_eq!(d.action, Action::Stay);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn letter_targets_are_one_based() {
        let d = Decision::parse(r#"{"action": "STAY", "target": "B"}"#);
        assert_eq!(d.target, Some(1));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn observation_json_has_expected_fields() {
        let json = Observation::for_hunter(&snapshot(), 0).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["self_position"]["x"], 1);
        assert_eq!(value["prey_captured"][1], true);
        assert_eq!(value["other_positions"].as_array().unwrap().len(), 1);
    }
}
