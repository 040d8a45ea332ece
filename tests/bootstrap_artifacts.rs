//! Exercises the on-disk bootstrap artifact layout §6 describes (a
//! directory holding `ca.pfx`/`ca.cer`), using `tempfile` the way the pack's
//! own crates isolate filesystem-touching tests from the real working
//! directory instead of writing into a fixed path.

use std::fs;
use std::sync::Arc;

use chrono::{TimeZone, Utc};

use psd2_qcert::clock::{Clock, FixedClock};
use psd2_qcert::pki::manager::{CertificateManager, ExportFormat};

#[test]
fn root_ca_bootstrap_artifacts_round_trip_through_a_directory() {
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(at));
    let manager = CertificateManager::new("ca.example.com", clock);
    let (entity, key_pair) = manager.create_root_ca(2048).unwrap();

    let dir = tempfile::tempdir().unwrap();

    let cer_path = dir.path().join("ca.cer");
    let der = manager.export(&entity, None, ExportFormat::Der).unwrap();
    fs::write(&cer_path, &der).unwrap();

    let pfx_path = dir.path().join("ca.pfx");
    let pfx = manager
        .export(
            &entity,
            Some(&key_pair),
            ExportFormat::Pkcs12 {
                password: "hunter2".to_string(),
            },
        )
        .unwrap();
    fs::write(&pfx_path, &pfx).unwrap();

    let reread_cer = fs::read(&cer_path).unwrap();
    assert_eq!(reread_cer, der);
    let reread_pfx = fs::read(&pfx_path).unwrap();
    assert_eq!(reread_pfx, pfx);

    // Both files actually landed under the bootstrap directory, not beside it.
    let entries: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries.len(), 2);
}
