//! Default tunables for new bodies, loadable from a JSON file.

use crate::{
    physics::{
        aa_box::AaBox,
        body::{
            check_gravity,
            check_mass,
            check_tunable,
        },
    },
};
use std::{
    path::Path,
    fs::File,
    io::{
        BufReader,
        BufWriter,
    },
};
use serde::{Serialize, Deserialize};
use anyhow::*;
use vek::*;


pub const SETTINGS_FILE_NAME: &'static str = "physics.json";


/// Tunables a new rigid body starts with. Missing fields take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    pub gravity: Vec3<f32>,
    pub terminal_velocity: Vec3<f32>,
    pub drag: Vec3<f32>,
    pub friction: Vec3<f32>,
    pub mass: f32,
    pub collidable: bool,
    pub kinematic: bool,
    pub pushable: bool,
    pub dimensions: Extent3<f32>,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        PhysicsSettings {
            gravity: Vec3::new(0.0, -0.1, 0.0),
            terminal_velocity: Vec3::new(10.0, 10.0, 10.0),
            drag: Vec3::new(0.005, 0.005, 0.005),
            friction: Vec3::new(0.05, 0.05, 0.05),
            mass: 1.0,
            collidable: true,
            kinematic: true,
            pushable: false,
            dimensions: Extent3::new(1.0, 1.0, 1.0),
        }
    }
}

impl PhysicsSettings {
    /// Read from `path`, falling back to defaults if that fails for any reason.
    pub fn read(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::try_read(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), "using default physics settings: {:#}", e);
            PhysicsSettings::default()
        })
    }

    /// Read from `path` and validate.
    pub fn try_read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings: Self = serde_json::from_reader(BufReader::new(File::open(path)?))
            .with_context(|| format!("parsing {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), self)?;
        Ok(())
    }

    /// Check every value is one a rigid body would accept.
    pub fn validate(&self) -> Result<()> {
        check_gravity(self.gravity)?;
        check_tunable("terminal velocity", self.terminal_velocity)?;
        check_tunable("drag", self.drag)?;
        check_tunable("friction", self.friction)?;
        check_mass(self.mass)?;
        AaBox::new(self.dimensions, Vec3::zero())?;
        Ok(())
    }
}


#[cfg(test)]
fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("pseudo3d-{}-{}", std::process::id(), name))
}

#[test]
fn test_default_is_valid() {
    assert!(PhysicsSettings::default().validate().is_ok());
}

#[test]
fn test_validate_rejects() {
    let mut settings = PhysicsSettings::default();
    settings.mass = 0.0;
    assert!(settings.validate().is_err());

    let mut settings = PhysicsSettings::default();
    settings.drag.y = -0.5;
    assert!(settings.validate().is_err());

    let mut settings = PhysicsSettings::default();
    settings.gravity.x = f32::NAN;
    assert!(settings.validate().is_err());

    let mut settings = PhysicsSettings::default();
    settings.dimensions.h = -1.0;
    assert!(settings.validate().is_err());
    assert!(crate::physics::body::RigidBody::from_settings(&settings).is_err());
}

#[test]
fn test_write_then_read() {
    let path = temp_path("write-then-read.json");
    let mut settings = PhysicsSettings::default();
    settings.mass = 2.5;
    settings.pushable = true;
    settings.dimensions = Extent3::new(0.8, 2.0, 0.8);
    settings.write(&path).unwrap();
    assert_eq!(PhysicsSettings::try_read(&path).unwrap(), settings);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_partial_file_fills_defaults() {
    let path = temp_path("partial.json");
    std::fs::write(&path, r#"{ "mass": 4.0, "kinematic": false }"#).unwrap();
    let settings = PhysicsSettings::try_read(&path).unwrap();
    assert_eq!(settings.mass, 4.0);
    assert!(!settings.kinematic);
    assert_eq!(settings.gravity, PhysicsSettings::default().gravity);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_bad_file_falls_back() {
    let path = temp_path("bad.json");
    std::fs::write(&path, r#"{ "mass": -1.0 }"#).unwrap();
    assert!(PhysicsSettings::try_read(&path).is_err());
    assert_eq!(PhysicsSettings::read(&path), PhysicsSettings::default());
    std::fs::remove_file(&path).unwrap();

    let missing = temp_path("missing.json");
    assert_eq!(PhysicsSettings::read(&missing), PhysicsSettings::default());
}

#[test]
fn test_body_from_settings() {
    let mut settings = PhysicsSettings::default();
    settings.kinematic = false;
    settings.friction = Vec3::new(0.5, 0.5, 0.5);
    settings.dimensions = Extent3::new(0.8, 2.0, 0.8);
    let body = crate::physics::body::RigidBody::from_settings(&settings).unwrap();
    assert!(!body.is_kinematic());
    assert_eq!(body.friction(), settings.friction);
    assert_eq!(body.bounding_box().ext(), settings.dimensions);
}
