//! Test utilities for the tracker crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled for tests or with the
//! `test-support` feature.

pub mod cap_fs {
    //! Capability-safe filesystem helpers for tests.
    //!
    //! The tracker forbids direct `std::fs` calls. These helpers provide
    //! read/write/existence operations built on `cap_std::fs::Dir` so test
    //! suites share consistent, policy-compliant file access.

    use std::ffi::OsString;
    use std::io;
    use std::path::Path;

    use cap_std::{ambient_authority, fs::Dir};

    /// Read a UTF-8 text file through `cap_std`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use poi_tracker::test_support::cap_fs::{read_file_to_string, write_file};
    ///
    /// let path = std::env::temp_dir().join("poi-tracker-cap-fs-read.txt");
    /// write_file(&path, b"hello\n")?;
    ///
    /// let content = read_file_to_string(&path)?;
    /// assert_eq!(content, "hello\n");
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn read_file_to_string(path: &Path) -> io::Result<String> {
        let (parent, file_name) = parent_and_file_name(path)?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.read_to_string(Path::new(&file_name))
    }

    /// Write bytes to a file through `cap_std`.
    pub fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
        let (parent, file_name) = parent_and_file_name(path)?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.write(Path::new(&file_name), contents)
    }

    /// Return true when `path` exists, false when it does not.
    pub fn path_exists(path: &Path) -> bool {
        let Ok((parent, file_name)) = parent_and_file_name(path) else {
            return false;
        };
        let Ok(directory) = Dir::open_ambient_dir(parent, ambient_authority()) else {
            return false;
        };
        directory.exists(Path::new(&file_name))
    }

    fn parent_and_file_name(path: &Path) -> io::Result<(&Path, OsString)> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "path must include a file or directory name",
            )
        })?;
        Ok((parent, file_name.to_os_string()))
    }
}

pub mod clock {
    //! A clock tests can move forward by hand.

    use std::sync::Mutex;
    use std::time::Duration;

    use chrono::{DateTime, Local, TimeDelta, Utc};
    use mockable::Clock;

    pub struct MutableClock(Mutex<DateTime<Utc>>);

    impl MutableClock {
        pub fn new(now: DateTime<Utc>) -> Self {
            Self(Mutex::new(now))
        }

        pub fn advance(&self, delta: Duration) {
            let delta = match TimeDelta::from_std(delta) {
                Ok(delta) => delta,
                Err(error) => {
                    panic!("failed to convert Duration to TimeDelta: {error}; delta={delta:?}",)
                }
            };
            *self.lock_clock() += delta;
        }

        fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
            match self.0.lock() {
                Ok(guard) => guard,
                Err(_) => panic!("clock mutex"),
            }
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.lock_clock()
        }
    }
}

pub mod doubles {
    //! Recording port doubles.
    //!
    //! Unlike `mockall` mocks these keep a call log that scenario tests can
    //! inspect after the fact, and they can be scripted to fail.

    use std::collections::VecDeque;
    use std::sync::{Mutex, MutexGuard};

    use async_trait::async_trait;

    use crate::domain::ports::{
        MonitorHandle, Notification, Notifier, NotifierError, ZoneMonitor, ZoneMonitorError,
    };
    use crate::domain::{MonitoringSet, ZoneId};

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        match mutex.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("test double mutex"),
        }
    }

    /// A call received by [`RecordingNotifier`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum NotifierCall {
        Show(Notification),
        Dismiss(u32),
        DismissAll,
    }

    /// Notifier that records calls and tracks which ids are visible.
    #[derive(Default)]
    pub struct RecordingNotifier {
        calls: Mutex<Vec<NotifierCall>>,
        visible: Mutex<Vec<u32>>,
        fail_shows: Mutex<bool>,
    }

    impl RecordingNotifier {
        pub fn calls(&self) -> Vec<NotifierCall> {
            lock(&self.calls).clone()
        }

        /// Notifications passed to `show`, in call order.
        pub fn shown(&self) -> Vec<Notification> {
            lock(&self.calls)
                .iter()
                .filter_map(|call| match call {
                    NotifierCall::Show(notification) => Some(notification.clone()),
                    _ => None,
                })
                .collect()
        }

        /// Ids currently visible, in the order first shown.
        pub fn visible(&self) -> Vec<u32> {
            lock(&self.visible).clone()
        }

        pub fn fail_shows(&self) {
            *lock(&self.fail_shows) = true;
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn show(&self, notification: Notification) -> Result<(), NotifierError> {
            let id = notification.id;
            lock(&self.calls).push(NotifierCall::Show(notification));
            if *lock(&self.fail_shows) {
                return Err(NotifierError::unavailable("scripted failure"));
            }
            let mut visible = lock(&self.visible);
            if !visible.contains(&id) {
                visible.push(id);
            }
            Ok(())
        }

        async fn dismiss(&self, id: u32) -> Result<(), NotifierError> {
            lock(&self.calls).push(NotifierCall::Dismiss(id));
            lock(&self.visible).retain(|visible| *visible != id);
            Ok(())
        }

        async fn dismiss_all(&self) -> Result<(), NotifierError> {
            lock(&self.calls).push(NotifierCall::DismissAll);
            lock(&self.visible).clear();
            Ok(())
        }
    }

    /// A call received by [`ScriptedZoneMonitor`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum MonitorCall {
        Register {
            handle: MonitorHandle,
            zone_ids: Vec<ZoneId>,
        },
        Deregister(MonitorHandle),
    }

    /// Zone monitor that records calls, tracks live registrations, and fails
    /// on request.
    ///
    /// Scripted failures are consumed one per call in the order queued.
    #[derive(Default)]
    pub struct ScriptedZoneMonitor {
        calls: Mutex<Vec<MonitorCall>>,
        live: Mutex<Vec<(MonitorHandle, Vec<ZoneId>)>>,
        register_failures: Mutex<VecDeque<ZoneMonitorError>>,
        deregister_failures: Mutex<VecDeque<ZoneMonitorError>>,
    }

    impl ScriptedZoneMonitor {
        pub fn calls(&self) -> Vec<MonitorCall> {
            lock(&self.calls).clone()
        }

        /// Zone ids registered and not yet retired, across all handles.
        pub fn live_zone_ids(&self) -> Vec<ZoneId> {
            lock(&self.live)
                .iter()
                .flat_map(|(_, ids)| ids.iter().copied())
                .collect()
        }

        /// Number of handles with live registrations.
        pub fn live_registrations(&self) -> usize {
            lock(&self.live).len()
        }

        pub fn fail_next_register(&self, error: ZoneMonitorError) {
            lock(&self.register_failures).push_back(error);
        }

        pub fn fail_next_deregister(&self, error: ZoneMonitorError) {
            lock(&self.deregister_failures).push_back(error);
        }
    }

    #[async_trait]
    impl ZoneMonitor for ScriptedZoneMonitor {
        async fn register_zones(
            &self,
            handle: MonitorHandle,
            set: &MonitoringSet,
        ) -> Result<(), ZoneMonitorError> {
            let zone_ids = set.zone_ids();
            lock(&self.calls).push(MonitorCall::Register {
                handle,
                zone_ids: zone_ids.clone(),
            });
            if let Some(error) = lock(&self.register_failures).pop_front() {
                return Err(error);
            }
            lock(&self.live).push((handle, zone_ids));
            Ok(())
        }

        async fn deregister_zones(&self, handle: MonitorHandle) -> Result<(), ZoneMonitorError> {
            lock(&self.calls).push(MonitorCall::Deregister(handle));
            if let Some(error) = lock(&self.deregister_failures).pop_front() {
                return Err(error);
            }
            lock(&self.live).retain(|(live, _)| *live != handle);
            Ok(())
        }
    }
}

pub mod catalogs {
    //! The two-region catalog used throughout the tests.
    //!
    //! Geneva (id 1, 16 km²) owns "Epicerie Delices" (POI 1) and
    //! "Planete Charmilles" (POI 2); Lausanne (id 2, 42 km²) owns
    //! "Geosatis" (POI 3).

    use crate::domain::{Catalog, Coordinate, Poi, Region};

    /// The same catalog as a seed document.
    pub const SEED_JSON: &str = r#"{
  "version": 1,
  "regions": [
    { "name": "Geneva", "lat": 46.2, "long": 6.15, "areaKm2": 16 },
    { "name": "Lausanne", "lat": 46.519833, "long": 6.6335, "areaKm2": 42 }
  ],
  "pois": [
    { "name": "Epicerie Delices", "lat": 46.206169, "long": 6.132623, "category": "Grocery" },
    { "name": "Planete Charmilles", "lat": 46.208333, "long": 6.124292, "category": "Shopping" },
    { "name": "Geosatis", "lat": 46.517494, "long": 6.562019, "category": "Business" }
  ]
}
"#;

    fn coordinate(lat: f64, lng: f64) -> Coordinate {
        match Coordinate::new(lat, lng) {
            Ok(coordinate) => coordinate,
            Err(error) => panic!("fixture coordinate: {error}"),
        }
    }

    fn region(id: u32, name: &str, lat: f64, lng: f64, area_km2: u32) -> Region {
        match Region::new(id, name, coordinate(lat, lng), area_km2) {
            Ok(region) => region,
            Err(error) => panic!("fixture region: {error}"),
        }
    }

    pub fn geneva() -> Region {
        region(1, "Geneva", 46.2, 6.15, 16)
    }

    pub fn lausanne() -> Region {
        region(2, "Lausanne", 46.519_833, 6.6335, 42)
    }

    pub fn raw_pois() -> Vec<Poi> {
        [
            ("Epicerie Delices", 46.206_169, 6.132_623, "Grocery"),
            ("Planete Charmilles", 46.208_333, 6.124_292, "Shopping"),
            ("Geosatis", 46.517_494, 6.562_019, "Business"),
        ]
        .into_iter()
        .map(|(name, lat, lng, category)| Poi {
            name: name.to_owned(),
            location: coordinate(lat, lng),
            category: category.to_owned(),
        })
        .collect()
    }

    pub fn seeded_catalog() -> Catalog {
        match Catalog::build(vec![geneva(), lausanne()], &raw_pois()) {
            Ok(catalog) => catalog,
            Err(error) => panic!("fixture catalog: {error}"),
        }
    }

    /// A point just inside Lausanne, near its centroid.
    pub fn central_lausanne() -> Coordinate {
        coordinate(46.52, 6.63)
    }
}

pub mod workspace {
    //! Temporary directories holding catalog files.

    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    use super::cap_fs::write_file;
    use super::catalogs::SEED_JSON;

    /// A temporary directory with a seed document and room for the
    /// expanded list. Removed on drop.
    pub struct CatalogWorkspace {
        _dir: TempDir,
        root: Utf8PathBuf,
    }

    impl CatalogWorkspace {
        /// Workspace whose seed is [`SEED_JSON`].
        pub fn with_default_seed() -> Self {
            Self::with_seed(SEED_JSON)
        }

        pub fn with_seed(seed_json: &str) -> Self {
            let dir = match TempDir::new() {
                Ok(dir) => dir,
                Err(error) => panic!("create temp dir: {error}"),
            };
            let root = match Utf8PathBuf::from_path_buf(dir.path().to_path_buf()) {
                Ok(root) => root,
                Err(path) => panic!("temp dir is not UTF-8: {}", path.display()),
            };
            let workspace = Self { _dir: dir, root };
            if let Err(error) = write_file(workspace.seed_path().as_std_path(), seed_json.as_bytes())
            {
                panic!("write seed: {error}");
            }
            workspace
        }

        pub fn path(&self) -> &Utf8PathBuf {
            &self.root
        }

        pub fn seed_path(&self) -> Utf8PathBuf {
            self.root.join("seed.json")
        }

        pub fn expanded_path(&self) -> Utf8PathBuf {
            self.root.join("expanded_pois.json")
        }
    }
}
