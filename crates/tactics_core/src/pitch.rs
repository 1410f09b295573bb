use indexmap::IndexMap;

use crate::models::{FormationDescriptor, FormationTemplate};

/// Coordinate used for a slot missing from the template.
pub const PITCH_CENTER: f64 = 50.0;

/// A role/duty assignment placed on the 0-100 pitch plane.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchPosition {
    pub slot_id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub role: String,
    pub duty: String,
}

/// Project a formation's assignments onto its template slots.
///
/// Empty without a descriptor or when the shape has no template.
pub fn formation_positions(
    descriptor: Option<&FormationDescriptor>,
    templates: &IndexMap<String, FormationTemplate>,
) -> Vec<PitchPosition> {
    let Some(descriptor) = descriptor else {
        return Vec::new();
    };
    let Some(template) = templates.get(&descriptor.shape) else {
        log::debug!("No template for formation {}", descriptor.shape);
        return Vec::new();
    };

    descriptor
        .positions
        .iter()
        .map(|assignment| {
            let slot = template.slot(&assignment.slot_id);
            PitchPosition {
                slot_id: assignment.slot_id.clone(),
                label: slot
                    .and_then(|s| s.label.clone())
                    .filter(|l| !l.is_empty())
                    .unwrap_or_else(|| assignment.slot_id.clone()),
                x: slot.map_or(PITCH_CENTER, |s| s.x),
                y: slot.map_or(PITCH_CENTER, |s| s.y),
                role: assignment.role.clone(),
                duty: assignment.duty.clone(),
            }
        })
        .collect()
}
