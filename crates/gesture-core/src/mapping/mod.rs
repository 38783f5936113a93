//! Mapping registry: turns emitted gestures into control values.
//!
//! Each frame the registry:
//! 1. Expires active gestures that have not been updated recently.
//! 2. Matches gestures against enabled mappings (type, confidence, hands,
//!    cooldown, zones).
//! 3. Computes the mapped value: raw value, calibration, curve, dead zone,
//!    then the mapping's own smoothing.
//! 4. Resolves conflicts so at most one active gesture drives each control.

pub mod extract;
pub mod interpolation;

pub use extract::{gesture_hand_center, raw_value};
pub use interpolation::{apply_curve, apply_dead_zone, apply_dead_zone_in, interpolate};

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use oxboard_common::{OxboardError, OxboardResult};
use oxboard_gesture_model::{
    ActiveGesture, CalibrationData, ConflictReason, ControlType, GestureConflict, GestureMapping,
    GestureResult, HandPositions, HandRequirement, HandResult, HandSide, Handedness,
    MappingProfile, TimestampMs,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Active gestures without an update for longer than this are dropped.
    pub active_timeout_ms: u64,
    /// Conflict records older than this are pruned.
    pub conflict_retention_ms: u64,
    /// A hand counts as present for hand requirements above this confidence.
    pub hand_presence_confidence: f64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            active_timeout_ms: 500,
            conflict_retention_ms: 100,
            hand_presence_confidence: 0.5,
        }
    }
}

/// Registered mappings plus their runtime state.
#[derive(Debug, Clone, Default)]
pub struct MappingRegistry {
    config: RegistryConfig,
    mappings: BTreeMap<String, GestureMapping>,
    active: BTreeMap<String, ActiveGesture>,
    last_updates: HashMap<String, TimestampMs>,
    conflicts: Vec<GestureConflict>,
    calibration: Option<CalibrationData>,
}

impl MappingRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Validate and register a mapping.
    ///
    /// An existing mapping with the same id is replaced and its runtime
    /// state dropped. On error the registry is unchanged.
    pub fn register(&mut self, mapping: GestureMapping) -> OxboardResult<()> {
        check(&mapping)?;
        self.insert(mapping);
        Ok(())
    }

    /// Register every mapping of a profile, or none if any is invalid.
    ///
    /// Returns the number of mappings registered.
    pub fn register_profile(&mut self, profile: &MappingProfile) -> OxboardResult<usize> {
        let rejected: Vec<OxboardError> = profile
            .mappings
            .iter()
            .filter_map(|m| check(m).err())
            .collect();
        if !rejected.is_empty() {
            return Err(OxboardError::InvalidProfile {
                id: profile.id.clone(),
                count: rejected.len(),
                rejected,
            });
        }

        for mapping in &profile.mappings {
            self.insert(mapping.clone());
        }
        tracing::debug!(
            profile = %profile.id,
            mappings = profile.mappings.len(),
            "Registered mapping profile"
        );
        Ok(profile.mappings.len())
    }

    fn insert(&mut self, mapping: GestureMapping) {
        let id = mapping.id.clone();
        if self.mappings.contains_key(&id) {
            self.drop_runtime_state(&id);
            tracing::debug!(mapping = %id, "Replaced mapping");
        } else {
            tracing::debug!(
                mapping = %id,
                gesture = mapping.gesture_type.as_str(),
                control = mapping.control_type.as_str(),
                "Registered mapping"
            );
        }
        self.mappings.insert(id, mapping);
    }

    /// Remove a mapping with its active gesture and conflict records.
    pub fn unregister(&mut self, id: &str) -> bool {
        if self.mappings.remove(id).is_none() {
            return false;
        }
        self.drop_runtime_state(id);
        tracing::debug!(mapping = %id, "Unregistered mapping");
        true
    }

    /// Enable or disable a mapping. Disabling drops its active gesture.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
        let Some(mapping) = self.mappings.get_mut(id) else {
            return false;
        };
        mapping.enabled = enabled;
        if !enabled {
            self.active.remove(id);
        }
        true
    }

    pub fn set_calibration(&mut self, calibration: Option<CalibrationData>) {
        self.calibration = calibration;
    }

    pub fn calibration(&self) -> Option<&CalibrationData> {
        self.calibration.as_ref()
    }

    fn drop_runtime_state(&mut self, id: &str) {
        self.active.remove(id);
        self.last_updates.remove(id);
        self.conflicts.retain(|c| !c.involves(id));
    }

    /// Evaluate one frame of emitted gestures.
    ///
    /// Returns the active gestures after conflict resolution, ordered by
    /// mapping id.
    pub fn process_gestures(
        &mut self,
        gestures: &[GestureResult],
        hands: &[HandResult],
        timestamp_ms: TimestampMs,
    ) -> Vec<ActiveGesture> {
        let timeout = self.config.active_timeout_ms;
        self.active.retain(|id, active| {
            let keep = !active.is_expired(timestamp_ms, timeout);
            if !keep {
                tracing::trace!(mapping = %id, "Active gesture expired");
            }
            keep
        });

        let positions = hand_positions(hands);

        let mut updates = Vec::new();
        for mapping in self.mappings.values().filter(|m| m.enabled) {
            if self.in_cooldown(mapping, timestamp_ms) {
                continue;
            }
            let best = gestures
                .iter()
                .filter(|g| g.gesture_type() == mapping.gesture_type)
                .filter(|g| g.confidence >= mapping.min_confidence)
                .filter(|g| self.hands_satisfy(mapping.hand_requirement, g, hands))
                .filter_map(|g| zone_match(mapping, hands).map(|zone| (g, zone)))
                .fold(None::<(&GestureResult, Option<String>)>, |best, (g, zone)| {
                    match best {
                        Some((b, _)) if b.confidence >= g.confidence => best,
                        _ => Some((g, zone)),
                    }
                });
            if let Some((gesture, zone)) = best {
                updates.push((mapping.id.clone(), gesture, zone));
            }
        }

        for (id, gesture, zone) in updates {
            self.apply_update(&id, gesture, zone, hands, positions, timestamp_ms);
        }

        self.resolve_conflicts(timestamp_ms);

        let retention = self.config.conflict_retention_ms;
        self.conflicts
            .retain(|c| timestamp_ms.saturating_sub(c.timestamp) <= retention);

        self.active_gestures()
    }

    fn in_cooldown(&self, mapping: &GestureMapping, now: TimestampMs) -> bool {
        mapping.cooldown_ms > 0
            && self
                .last_updates
                .get(&mapping.id)
                .is_some_and(|last| now.saturating_sub(*last) < mapping.cooldown_ms)
    }

    fn hands_satisfy(
        &self,
        requirement: HandRequirement,
        gesture: &GestureResult,
        hands: &[HandResult],
    ) -> bool {
        let floor = self.config.hand_presence_confidence;
        let present = |handedness: Handedness| {
            hands
                .iter()
                .any(|h| h.handedness == handedness && h.is_usable() && h.confidence > floor)
        };
        let from = |side: HandSide| gesture.hand.map_or(true, |h| h == side || h == HandSide::Both);
        match requirement {
            HandRequirement::Left => present(Handedness::Left) && from(HandSide::Left),
            HandRequirement::Right => present(Handedness::Right) && from(HandSide::Right),
            HandRequirement::Both => present(Handedness::Left) && present(Handedness::Right),
            HandRequirement::Either => present(Handedness::Left) || present(Handedness::Right),
        }
    }

    fn apply_update(
        &mut self,
        id: &str,
        gesture: &GestureResult,
        zone: Option<String>,
        hands: &[HandResult],
        positions: HandPositions,
        timestamp_ms: TimestampMs,
    ) {
        let Some(mapping) = self.mappings.get(id) else {
            return;
        };

        let raw = raw_value(gesture, hands);
        let calibrated = self.calibration.map_or(raw, |c| c.apply(raw));
        let curved = interpolate(
            calibrated,
            &mapping.input_range,
            &mapping.output_range,
            mapping.interpolation,
            mapping.inverted,
        );
        let value = apply_dead_zone_in(curved, mapping.dead_zone, &mapping.output_range);

        let previous = self.active.get(id);
        let mapped_value = match previous {
            Some(prev) if mapping.smoothing > 0.0 => {
                prev.mapped_value * mapping.smoothing + value * (1.0 - mapping.smoothing)
            }
            _ => value,
        };
        let start_time = previous.map_or(timestamp_ms, |p| p.start_time);

        let active = ActiveGesture {
            mapping_id: id.to_string(),
            control_type: mapping.control_type,
            confidence: gesture.confidence,
            raw_value: raw,
            mapped_value,
            active_zone: zone,
            start_time,
            last_update: timestamp_ms,
            is_held: timestamp_ms.saturating_sub(start_time) >= mapping.hold_time_ms,
            hand_positions: positions,
        };
        tracing::trace!(
            mapping = %id,
            raw,
            mapped = mapped_value,
            held = active.is_held,
            "Active gesture updated"
        );
        self.active.insert(id.to_string(), active);
        self.last_updates.insert(id.to_string(), timestamp_ms);
    }

    fn resolve_conflicts(&mut self, timestamp_ms: TimestampMs) {
        let mut groups: BTreeMap<ControlType, Vec<&ActiveGesture>> = BTreeMap::new();
        for active in self.active.values() {
            groups.entry(active.control_type).or_default().push(active);
        }

        let mut losers = Vec::new();
        let mut records = Vec::new();
        for (control_type, mut members) in groups {
            if members.len() < 2 {
                continue;
            }
            members.sort_by(|a, b| self.rank(a, b));
            let winner = members[0].mapping_id.clone();
            let mapping_ids: Vec<String> = members.iter().map(|a| a.mapping_id.clone()).collect();
            losers.extend(mapping_ids.iter().skip(1).cloned());
            tracing::debug!(
                control = control_type.as_str(),
                winner = %winner,
                competing = mapping_ids.len(),
                "Resolved mapping conflict"
            );
            records.push(GestureConflict {
                control_type,
                mapping_ids,
                winner,
                timestamp: timestamp_ms,
                reason: ConflictReason::Priority,
            });
        }

        for id in losers {
            self.active.remove(&id);
        }
        self.conflicts.extend(records);
    }

    /// Priority desc, confidence desc, start time asc, then id.
    fn rank(&self, a: &ActiveGesture, b: &ActiveGesture) -> Ordering {
        let priority = |g: &ActiveGesture| self.mappings.get(&g.mapping_id).map_or(0, |m| m.priority);
        priority(b)
            .cmp(&priority(a))
            .then_with(|| b.confidence.total_cmp(&a.confidence))
            .then_with(|| a.start_time.cmp(&b.start_time))
            .then_with(|| a.mapping_id.cmp(&b.mapping_id))
    }

    /// Snapshot of active gestures ordered by mapping id.
    pub fn active_gestures(&self) -> Vec<ActiveGesture> {
        self.active.values().cloned().collect()
    }

    pub fn active(&self, id: &str) -> Option<&ActiveGesture> {
        self.active.get(id)
    }

    pub fn conflicts(&self) -> &[GestureConflict] {
        &self.conflicts
    }

    /// Conflicts still within the retention window at `timestamp_ms`,
    /// without pruning the stored records.
    pub fn conflicts_at(&self, timestamp_ms: TimestampMs) -> Vec<GestureConflict> {
        let retention = self.config.conflict_retention_ms;
        self.conflicts
            .iter()
            .filter(|c| timestamp_ms.saturating_sub(c.timestamp) <= retention)
            .cloned()
            .collect()
    }

    pub fn mapping(&self, id: &str) -> Option<&GestureMapping> {
        self.mappings.get(id)
    }

    pub fn mappings(&self) -> impl Iterator<Item = &GestureMapping> {
        self.mappings.values()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Drop all runtime state, keeping the mappings.
    pub fn clear_state(&mut self) {
        self.active.clear();
        self.last_updates.clear();
        self.conflicts.clear();
    }
}

fn check(mapping: &GestureMapping) -> OxboardResult<()> {
    let issues = mapping.validate();
    if issues.is_empty() {
        return Ok(());
    }
    Err(OxboardError::invalid_mapping(
        mapping.id.clone(),
        issues.iter().map(ToString::to_string).collect(),
    ))
}

/// `Some(zone id)` when a usable hand center lies in one of the mapping's
/// zones, `Some(None)` when the mapping has no zones, `None` otherwise.
fn zone_match(mapping: &GestureMapping, hands: &[HandResult]) -> Option<Option<String>> {
    if mapping.zones.is_empty() {
        return Some(None);
    }
    let centers: Vec<_> = hands.iter().filter_map(HandResult::center).collect();
    mapping
        .zones
        .iter()
        .find(|zone| centers.iter().any(|c| zone.contains(c)))
        .map(|zone| Some(zone.id.clone()))
}

fn hand_positions(hands: &[HandResult]) -> HandPositions {
    let center = |handedness: Handedness| {
        hands
            .iter()
            .find(|h| h.handedness == handedness && h.is_usable())
            .and_then(HandResult::center)
    };
    HandPositions {
        left: center(Handedness::Left),
        right: center(Handedness::Right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{self, Pose};
    use oxboard_gesture_model::{GestureKind, GestureType, Point, ValueRange, Zone};

    fn pinch(strength: f64, confidence: f64, t: TimestampMs) -> GestureResult {
        GestureResult::new(
            GestureKind::Pinch {
                strength,
                distance: 0.08 * (1.0 - strength),
                position: Point::new(0.5, 0.5),
            },
            confidence,
            t,
            Some(HandSide::Right),
        )
    }

    fn right_hand() -> Vec<HandResult> {
        vec![synthetic::hand(Pose::Pinch, Handedness::Right, Point::new(0.6, 0.7), 0.9)]
    }

    fn volume(id: &str, priority: i32) -> GestureMapping {
        GestureMapping {
            priority,
            ..GestureMapping::new(id, id, GestureType::Pinch, ControlType::Volume)
        }
    }

    #[test]
    fn test_invalid_mapping_is_rejected_and_registry_unchanged() {
        let mut registry = MappingRegistry::default();
        let bad = GestureMapping {
            dead_zone: 1.5,
            min_confidence: -0.1,
            ..volume("bad", 0)
        };
        let err = registry.register(bad).unwrap_err();
        assert_eq!(err.issues().len(), 2);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_profile_is_all_or_nothing() {
        let mut registry = MappingRegistry::default();
        let mut profile = MappingProfile::new("p", "Profile");
        profile.mappings.push(volume("a", 0));
        profile.mappings.push(GestureMapping {
            smoothing: 2.0,
            ..volume("b", 0)
        });
        match registry.register_profile(&profile) {
            Err(OxboardError::InvalidProfile { count, .. }) => assert_eq!(count, 1),
            other => panic!("unexpected {other:?}"),
        }
        assert!(registry.is_empty());

        profile.mappings.pop();
        assert_eq!(registry.register_profile(&profile).unwrap(), 1);
        assert!(registry.mapping("a").is_some());
    }

    #[test]
    fn test_pinch_drives_volume() {
        let mut registry = MappingRegistry::default();
        registry.register(volume("vol", 0)).unwrap();

        let active = registry.process_gestures(&[pinch(0.625, 0.9, 0)], &right_hand(), 0);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].mapping_id, "vol");
        assert!((active[0].mapped_value - 0.625).abs() < 1e-12);
        assert!(active[0].hand_positions.right.is_some());
        assert!(active[0].hand_positions.left.is_none());
    }

    #[test]
    fn test_low_confidence_and_disabled_mappings_do_not_fire() {
        let mut registry = MappingRegistry::default();
        registry.register(volume("vol", 0)).unwrap();
        assert!(registry
            .process_gestures(&[pinch(0.5, 0.65, 0)], &right_hand(), 0)
            .is_empty());

        assert!(registry.set_enabled("vol", false));
        assert!(registry
            .process_gestures(&[pinch(0.5, 0.9, 33)], &right_hand(), 33)
            .is_empty());
        assert!(!registry.set_enabled("missing", true));
    }

    #[test]
    fn test_hand_requirement() {
        let mut registry = MappingRegistry::default();
        registry
            .register(GestureMapping {
                hand_requirement: HandRequirement::Left,
                ..volume("left-only", 0)
            })
            .unwrap();
        assert!(registry
            .process_gestures(&[pinch(0.5, 0.9, 0)], &right_hand(), 0)
            .is_empty());
    }

    #[test]
    fn test_highest_confidence_gesture_wins_within_mapping() {
        let mut registry = MappingRegistry::default();
        registry.register(volume("vol", 0)).unwrap();
        let active = registry.process_gestures(
            &[pinch(0.2, 0.8, 0), pinch(0.9, 0.95, 0), pinch(0.4, 0.85, 0)],
            &right_hand(),
            0,
        );
        assert!((active[0].mapped_value - 0.9).abs() < 1e-12);
        assert_eq!(active[0].confidence, 0.95);
    }

    #[test]
    fn test_conflict_goes_to_higher_confidence_at_equal_priority() {
        let mut registry = MappingRegistry::default();
        registry.register(volume("a", 2)).unwrap();
        registry
            .register(GestureMapping {
                priority: 2,
                ..GestureMapping::new("b", "b", GestureType::FingerCount, ControlType::Volume)
            })
            .unwrap();

        let gestures = [
            pinch(0.5, 0.8, 0),
            GestureResult::new(GestureKind::FingerCount { count: 3 }, 0.9, 0, Some(HandSide::Right)),
        ];
        let active = registry.process_gestures(&gestures, &right_hand(), 0);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].mapping_id, "b");

        let conflicts = registry.conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].winner, "b");
        assert_eq!(conflicts[0].reason, ConflictReason::Priority);

        assert_eq!(registry.conflicts_at(100).len(), 1);
        assert!(registry.conflicts_at(101).is_empty());

        // Conflicts are pruned after 100ms.
        registry.process_gestures(&[], &right_hand(), 150);
        assert!(registry.conflicts().is_empty());
    }

    #[test]
    fn test_priority_beats_confidence() {
        let mut registry = MappingRegistry::default();
        registry.register(volume("a", 5)).unwrap();
        registry
            .register(GestureMapping {
                priority: 1,
                ..GestureMapping::new("b", "b", GestureType::FingerCount, ControlType::Volume)
            })
            .unwrap();
        let gestures = [
            pinch(0.5, 0.75, 0),
            GestureResult::new(GestureKind::FingerCount { count: 3 }, 0.99, 0, Some(HandSide::Right)),
        ];
        let active = registry.process_gestures(&gestures, &right_hand(), 0);
        assert_eq!(active[0].mapping_id, "a");
    }

    #[test]
    fn test_expiry_after_timeout() {
        let mut registry = MappingRegistry::default();
        registry.register(volume("vol", 0)).unwrap();
        registry.process_gestures(&[pinch(0.5, 0.9, 0)], &right_hand(), 0);

        assert_eq!(registry.process_gestures(&[], &right_hand(), 500).len(), 1);
        assert!(registry.process_gestures(&[], &right_hand(), 501).is_empty());
    }

    #[test]
    fn test_unregister_removes_state() {
        let mut registry = MappingRegistry::default();
        registry.register(volume("a", 1)).unwrap();
        registry.register(volume("b", 2)).unwrap();
        registry.process_gestures(&[pinch(0.5, 0.9, 0)], &right_hand(), 0);
        assert_eq!(registry.conflicts().len(), 1);

        assert!(registry.unregister("b"));
        assert!(registry.active("b").is_none());
        assert!(registry.conflicts().is_empty());
        assert!(!registry.unregister("b"));
    }

    #[test]
    fn test_reregistering_replaces_and_drops_state() {
        let mut registry = MappingRegistry::default();
        registry.register(volume("vol", 0)).unwrap();
        registry.process_gestures(&[pinch(0.5, 0.9, 0)], &right_hand(), 0);
        assert!(registry.active("vol").is_some());

        registry
            .register(GestureMapping {
                output_range: ValueRange::new(0.0, 2.0),
                ..volume("vol", 0)
            })
            .unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.active("vol").is_none());
    }

    #[test]
    fn test_cooldown_blocks_updates() {
        let mut registry = MappingRegistry::default();
        registry
            .register(GestureMapping {
                cooldown_ms: 100,
                ..volume("vol", 0)
            })
            .unwrap();
        registry.process_gestures(&[pinch(0.5, 0.9, 0)], &right_hand(), 0);
        let active = registry.process_gestures(&[pinch(0.9, 0.9, 50)], &right_hand(), 50);
        assert!((active[0].mapped_value - 0.5).abs() < 1e-12);
        let active = registry.process_gestures(&[pinch(0.9, 0.9, 100)], &right_hand(), 100);
        assert!((active[0].mapped_value - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_hold_time_and_start_time() {
        let mut registry = MappingRegistry::default();
        registry
            .register(GestureMapping {
                hold_time_ms: 200,
                ..volume("vol", 0)
            })
            .unwrap();
        let first = registry.process_gestures(&[pinch(0.5, 0.9, 0)], &right_hand(), 0);
        assert!(!first[0].is_held);
        registry.process_gestures(&[pinch(0.5, 0.9, 100)], &right_hand(), 100);
        let held = registry.process_gestures(&[pinch(0.5, 0.9, 200)], &right_hand(), 200);
        assert!(held[0].is_held);
        assert_eq!(held[0].start_time, 0);
        assert_eq!(held[0].duration_ms(), 200);
    }

    #[test]
    fn test_zones_gate_and_report() {
        let mut registry = MappingRegistry::default();
        registry
            .register(GestureMapping {
                zones: vec![
                    Zone::rectangle("top", 0.0, 0.0, 1.0, 0.3),
                    Zone::rectangle("right", 0.5, 0.0, 0.5, 1.0),
                ],
                ..volume("vol", 0)
            })
            .unwrap();
        let active = registry.process_gestures(&[pinch(0.5, 0.9, 0)], &right_hand(), 0);
        assert_eq!(active[0].active_zone.as_deref(), Some("right"));

        let left_side = vec![synthetic::hand(Pose::Pinch, Handedness::Right, Point::new(0.2, 0.8), 0.9)];
        let mut registry_b = MappingRegistry::default();
        registry_b
            .register(GestureMapping {
                zones: vec![Zone::rectangle("right", 0.5, 0.0, 0.5, 1.0)],
                ..volume("vol", 0)
            })
            .unwrap();
        assert!(registry_b
            .process_gestures(&[pinch(0.5, 0.9, 0)], &left_side, 0)
            .is_empty());
    }

    #[test]
    fn test_calibration_smoothing_and_dead_zone() {
        let mut registry = MappingRegistry::default();
        registry
            .register(GestureMapping {
                dead_zone: 0.05,
                smoothing: 0.5,
                ..volume("vol", 0)
            })
            .unwrap();
        registry.set_calibration(Some(CalibrationData::new(0.5)));

        let first = registry.process_gestures(&[pinch(0.06, 0.9, 0)], &right_hand(), 0);
        // 0.06 * 0.5 = 0.03 falls inside the dead zone.
        assert_eq!(first[0].mapped_value, 0.0);
        assert!((first[0].raw_value - 0.06).abs() < 1e-12);

        let second = registry.process_gestures(&[pinch(1.0, 0.9, 33)], &right_hand(), 33);
        let target = (0.5 - 0.05) / 0.95;
        assert!((second[0].mapped_value - target * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_playback_rate_dead_zone_stays_in_range() {
        let mut registry = MappingRegistry::default();
        registry
            .register(GestureMapping {
                input_range: ValueRange::new(0.4, 1.0),
                output_range: ValueRange::new(0.5, 2.0),
                dead_zone: 0.05,
                ..GestureMapping::new("rate", "rate", GestureType::Pinch, ControlType::PlaybackRate)
            })
            .unwrap();

        let low = registry.process_gestures(&[pinch(0.35, 0.9, 0)], &right_hand(), 0);
        assert_eq!(low[0].mapped_value, 0.5);

        let full = registry.process_gestures(&[pinch(1.0, 0.9, 33)], &right_hand(), 33);
        assert!((full[0].mapped_value - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_hand_positions_skip_unusable_hands() {
        let mut registry = MappingRegistry::default();
        registry.register(volume("vol", 0)).unwrap();

        let mut partial = synthetic::hand(Pose::Pinch, Handedness::Right, Point::new(0.2, 0.2), 0.9);
        partial.landmarks.truncate(5);
        let mut hands = vec![partial];
        hands.extend(right_hand());

        let active = registry.process_gestures(&[pinch(0.5, 0.9, 0)], &hands, 0);
        assert_eq!(active[0].hand_positions.right, hands[1].center());
    }
}
