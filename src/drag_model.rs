use serde::{Deserialize, Serialize};

/// Drag model enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DragModel {
    /// Vacuum trajectory, solved in closed form
    None,
    /// Flat-base reference projectile
    G1,
    /// Boat-tail reference projectile
    G7,
}

impl DragModel {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "NONE" | "NODRAG" | "VACUUM" => Some(DragModel::None),
            "G1" => Some(DragModel::G1),
            "G7" => Some(DragModel::G7),
            _ => None,
        }
    }

    /// Whether this model integrates against a drag table.
    pub fn has_drag(self) -> bool {
        !matches!(self, DragModel::None)
    }
}

impl Default for DragModel {
    fn default() -> Self {
        DragModel::G1
    }
}

impl std::fmt::Display for DragModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_model_from_str() {
        assert_eq!(DragModel::from_str("G1"), Some(DragModel::G1));
        assert_eq!(DragModel::from_str("G7"), Some(DragModel::G7));
        assert_eq!(DragModel::from_str("None"), Some(DragModel::None));
        assert_eq!(DragModel::from_str("nodrag"), Some(DragModel::None));
    }

    #[test]
    fn test_drag_model_from_str_case_insensitive() {
        assert_eq!(DragModel::from_str("g1"), Some(DragModel::G1));
        assert_eq!(DragModel::from_str(" g7 "), Some(DragModel::G7));
        assert_eq!(DragModel::from_str("none"), Some(DragModel::None));
    }

    #[test]
    fn test_drag_model_from_str_invalid() {
        assert_eq!(DragModel::from_str("G2"), None);
        assert_eq!(DragModel::from_str("G8"), None);
        assert_eq!(DragModel::from_str(""), None);
        assert_eq!(DragModel::from_str("invalid"), None);
    }

    #[test]
    fn test_drag_model_display() {
        assert_eq!(format!("{}", DragModel::G1), "G1");
        assert_eq!(format!("{}", DragModel::G7), "G7");
        assert_eq!(format!("{}", DragModel::None), "None");
    }

    #[test]
    fn test_has_drag() {
        assert!(DragModel::G1.has_drag());
        assert!(DragModel::G7.has_drag());
        assert!(!DragModel::None.has_drag());
    }
}
