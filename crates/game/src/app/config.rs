use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::characters::{
    CharacterKind, CharacterProfile, WorldBounds, ZBoundCheck, DEFAULT_BOUNDARY,
    DEFAULT_HEIGHT_MAX,
};

pub(crate) const CONFIG_FILE_NAME: &str = "world.json";

const DEFAULT_MOVE_TARGET: Vec3 = Vec3::new(8.3, 4.6, -18.7);
const DEFAULT_SPAWN_POINTS: [Vec3; 4] = [
    Vec3::new(8.3, 4.5, 3.0),
    Vec3::new(-8.3, 4.5, 3.0),
    Vec3::new(4.0, 1.0, -6.0),
    Vec3::new(-4.0, 1.0, -6.0),
];

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse config '{path}': {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid config value at {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Resolved world settings. Spawn points and profiles are indexed by
/// `CharacterKind::toggle_slot`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DemoConfig {
    pub(crate) bounds: WorldBounds,
    pub(crate) move_target: Vec3,
    pub(crate) spawn_points: [Vec3; 4],
    pub(crate) roster: [CharacterProfile; 4],
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            bounds: WorldBounds::default(),
            move_target: DEFAULT_MOVE_TARGET,
            spawn_points: DEFAULT_SPAWN_POINTS,
            roster: CharacterKind::ALL.map(CharacterProfile::default_for),
        }
    }
}

impl DemoConfig {
    pub(crate) fn spawn_point(&self, kind: CharacterKind) -> Vec3 {
        self.spawn_points[kind.toggle_slot()]
    }

    pub(crate) fn profile(&self, kind: CharacterKind) -> &CharacterProfile {
        &self.roster[kind.toggle_slot()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigVec3 {
    x: f32,
    y: f32,
    z: f32,
}

impl ConfigVec3 {
    fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CharacterFile {
    spawn_point: Option<ConfigVec3>,
    name: Option<String>,
    origin: Option<String>,
    talent: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RosterFile {
    angel: Option<CharacterFile>,
    devil: Option<CharacterFile>,
    doctor: Option<CharacterFile>,
    zombie: Option<CharacterFile>,
}

impl RosterFile {
    fn entry(&self, kind: CharacterKind) -> Option<&CharacterFile> {
        match kind {
            CharacterKind::Angel => self.angel.as_ref(),
            CharacterKind::Devil => self.devil.as_ref(),
            CharacterKind::Doctor => self.doctor.as_ref(),
            CharacterKind::Zombie => self.zombie.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    boundary: f32,
    height_max: f32,
    z_bound_check: ZBoundCheck,
    move_target: Option<ConfigVec3>,
    characters: RosterFile,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            boundary: DEFAULT_BOUNDARY,
            height_max: DEFAULT_HEIGHT_MAX,
            z_bound_check: ZBoundCheck::Strict,
            move_target: None,
            characters: RosterFile::default(),
        }
    }
}

pub(crate) fn config_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Loads the world config at `path`. A missing file yields the defaults.
pub(crate) fn load_config(path: &Path) -> Result<DemoConfig, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "config_missing_using_defaults");
            return Ok(DemoConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let file = parse_config_json(&raw).map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })?;
    let config = resolve_config(file)?;
    info!(
        path = %path.display(),
        boundary = config.bounds.boundary,
        height_max = config.bounds.height_max,
        z_check = ?config.bounds.z_check,
        "config_loaded"
    );
    Ok(config)
}

fn parse_config_json(raw: &str) -> Result<ConfigFile, String> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    match serde_path_to_error::deserialize::<_, ConfigFile>(&mut deserializer) {
        Ok(file) => Ok(file),
        Err(error) => {
            let path = error.path().to_string();
            let source = error.into_inner();
            if path.is_empty() || path == "." {
                Err(format!("parse config json: {source}"))
            } else {
                Err(format!("parse config json at {path}: {source}"))
            }
        }
    }
}

fn resolve_config(file: ConfigFile) -> Result<DemoConfig, ConfigError> {
    require_positive("boundary", file.boundary)?;
    require_positive("height_max", file.height_max)?;

    let mut config = DemoConfig {
        bounds: WorldBounds {
            boundary: file.boundary,
            height_max: file.height_max,
            z_check: file.z_bound_check,
        },
        ..DemoConfig::default()
    };
    if let Some(target) = file.move_target {
        config.move_target = target.to_vec3();
    }

    for kind in CharacterKind::ALL {
        let Some(entry) = file.characters.entry(kind) else {
            continue;
        };
        let slot = kind.toggle_slot();
        if let Some(point) = entry.spawn_point {
            config.spawn_points[slot] = point.to_vec3();
        }
        let profile = &mut config.roster[slot];
        if let Some(name) = &entry.name {
            profile.name = name.clone();
        }
        if let Some(origin) = &entry.origin {
            profile.origin = origin.clone();
        }
        if let Some(talent) = &entry.talent {
            profile.talent = talent.clone();
        }
    }

    Ok(config)
}

fn require_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        return Ok(());
    }
    Err(ConfigError::Invalid {
        field,
        message: format!("expected a positive finite number, got {value}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &tempfile::TempDir, json: &str) -> PathBuf {
        let path = config_path(dir.path());
        fs::write(&path, json).expect("write config");
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config(&config_path(dir.path())).expect("config");
        assert_eq!(config, DemoConfig::default());
    }

    #[test]
    fn defaults_match_stock_scene() {
        let config = DemoConfig::default();
        assert_eq!(config.bounds, WorldBounds::default());
        assert_eq!(config.move_target, Vec3::new(8.3, 4.6, -18.7));
        assert_eq!(
            config.spawn_point(CharacterKind::Zombie),
            Vec3::new(-4.0, 1.0, -6.0)
        );
        assert_eq!(config.profile(CharacterKind::Devil).origin, "Hell");
    }

    #[test]
    fn empty_object_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(&dir, "{}");
        assert_eq!(load_config(&path).expect("config"), DemoConfig::default());
    }

    #[test]
    fn overrides_apply_per_kind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(
            &dir,
            r#"{
                "boundary": 20.0,
                "z_bound_check": "legacy_repeat_x",
                "move_target": { "x": 1.0, "y": 2.0, "z": 3.0 },
                "characters": {
                    "doctor": {
                        "spawn_point": { "x": 2.0, "y": 1.5, "z": -2.0 },
                        "origin": "Ingolstadt"
                    }
                }
            }"#,
        );

        let config = load_config(&path).expect("config");
        assert_eq!(config.bounds.boundary, 20.0);
        assert_eq!(config.bounds.height_max, DEFAULT_HEIGHT_MAX);
        assert_eq!(config.bounds.z_check, ZBoundCheck::LegacyRepeatX);
        assert_eq!(config.move_target, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(
            config.spawn_point(CharacterKind::Doctor),
            Vec3::new(2.0, 1.5, -2.0)
        );
        let doctor = config.profile(CharacterKind::Doctor);
        assert_eq!(doctor.origin, "Ingolstadt");
        assert_eq!(doctor.name, "Frankenstein");
        assert_eq!(
            config.spawn_point(CharacterKind::Angel),
            Vec3::new(8.3, 4.5, 3.0)
        );
    }

    #[test]
    fn parse_error_names_field_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(
            &dir,
            r#"{ "characters": { "angel": { "spawn_point": { "x": "far", "y": 1.0, "z": 0.0 } } } }"#,
        );

        let err = load_config(&path).expect_err("bad type");
        let message = err.to_string();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(
            message.contains("characters.angel.spawn_point.x"),
            "unexpected message: {message}"
        );
    }

    #[test]
    fn unknown_field_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(&dir, r#"{ "boundry": 10.0 }"#);
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn non_positive_bounds_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(&dir, r#"{ "boundary": 0.0 }"#);
        match load_config(&path) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "boundary"),
            other => panic!("expected invalid boundary, got {other:?}"),
        }

        let path = write_config(&dir, r#"{ "height_max": -1.0 }"#);
        match load_config(&path) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "height_max"),
            other => panic!("expected invalid height, got {other:?}"),
        }
    }

    #[test]
    fn blank_profile_text_is_kept_for_spawn_to_reject() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(&dir, r#"{ "characters": { "zombie": { "name": "" } } }"#);
        let config = load_config(&path).expect("config");
        assert_eq!(config.profile(CharacterKind::Zombie).name, "");
    }
}
