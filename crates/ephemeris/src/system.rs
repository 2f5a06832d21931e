//! Immutable body catalog with parent lookups.

use std::cmp::Ordering;

use crate::{Body, EphemerisError};

/// Read-only snapshot of a planetary system.
#[derive(Debug, Clone, Default)]
pub struct SolarSystem {
    bodies: Vec<Body>,
}

impl SolarSystem {
    /// Wrap already-validated bodies. Catalog validation lives with the config conversion.
    pub fn new(bodies: Vec<Body>) -> Self {
        Self { bodies }
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Case-insensitive lookup by name.
    pub fn body(&self, name: &str) -> Result<&Body, EphemerisError> {
        self.bodies
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| EphemerisError::UnknownBody(name.to_string()))
    }

    /// Parent of `body`, or `None` for a root body.
    pub fn parent_of(&self, body: &Body) -> Result<Option<&Body>, EphemerisError> {
        body.parent.as_deref().map(|name| self.body(name)).transpose()
    }

    /// Bodies that orbit `parent_name`, in catalog order.
    pub fn children_of<'a, 'p>(
        &'a self,
        parent_name: &'p str,
    ) -> impl Iterator<Item = &'a Body> + use<'a, 'p> {
        self.bodies.iter().filter(move |b| {
            b.parent
                .as_deref()
                .is_some_and(|p| p.eq_ignore_ascii_case(parent_name))
        })
    }

    /// Valid transfer destinations from `origin`: its siblings, innermost first.
    pub fn destinations_for(&self, origin: &Body) -> Vec<&Body> {
        let Some(parent) = origin.parent.as_deref() else {
            return Vec::new();
        };
        let mut siblings: Vec<&Body> = self
            .children_of(parent)
            .filter(|b| !b.name.eq_ignore_ascii_case(&origin.name) && b.orbit.is_some())
            .collect();
        siblings.sort_by(|a, b| {
            let sma = |body: &Body| body.orbit.map(|o| o.semi_major_axis_m).unwrap_or(0.0);
            sma(a).partial_cmp(&sma(b)).unwrap_or(Ordering::Equal)
        });
        siblings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twp_orbits::Orbit;

    fn body(name: &str, parent: Option<&str>, sma: f64) -> Body {
        Body {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            mu_m3_s2: 1.0e9,
            radius_m: 1.0e5,
            default_parking_altitude_m: 1.0e4,
            orbit: parent.map(|_| Orbit::circular(sma, 0.0, 1.0e18).expect("orbit")),
        }
    }

    fn system() -> SolarSystem {
        SolarSystem::new(vec![
            body("Sun", None, 0.0),
            body("Outer", Some("Sun"), 3.0e10),
            body("Home", Some("Sun"), 2.0e10),
            body("Moon", Some("Home"), 1.0e7),
            body("Inner", Some("sun"), 1.0e10),
        ])
    }

    #[test]
    fn children_outlive_the_borrowed_parent_name() {
        let system = system();
        let children: Vec<&Body> = {
            let parent = String::from("SUN");
            system.children_of(&parent).collect()
        };
        let names: Vec<&str> = children.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Outer", "Home", "Inner"]);
    }

    #[test]
    fn destinations_are_siblings_innermost_first() {
        let system = system();
        // Detached copy so the result only borrows from the catalog.
        let origin = system.body("home").expect("home").clone();
        let names: Vec<&str> = system
            .destinations_for(&origin)
            .iter()
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(names, ["Inner", "Outer"]);

        let moon = system.body("Moon").expect("moon");
        assert!(system.destinations_for(moon).is_empty());
        let sun = system.body("Sun").expect("sun");
        assert!(system.destinations_for(sun).is_empty());
    }
}
