//! Integration tests running the whole merge against files on disk.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use kitbash::persist::backup_path;
use kitbash::prelude::*;
use kitbash::splice::DEFAULT_TRAILER;

use tempfile::TempDir;

const ACF: &str = "\
I
1100 Version
ACF
P _obja/0/_v10_att_file_stl cockpit.obj
P _obja/0/_v10_att_phi_ref 0.0
P _obja/0/_v10_att_psi_ref 0.0
P _obja/0/_v10_att_the_ref 0.0
P _obja/0/_v10_att_x_acf_prt_ref 0.0
P _obja/0/_v10_att_y_acf_prt_ref 0.0
P _obja/0/_v10_att_z_acf_prt_ref 0.0
P _obja/1/_v10_att_file_stl wiper1.obj
P _obja/1/_v10_att_phi_ref 0.0
P _obja/1/_v10_att_psi_ref 0.0
P _obja/1/_v10_att_the_ref 0.0
P _obja/1/_v10_att_x_acf_prt_ref 0.0
P _obja/1/_v10_att_y_acf_prt_ref 0.0
P _obja/1/_v10_att_z_acf_prt_ref 10.0
";

const MANIP: &str = "\
I
800
OBJ

TEXTURE panel.png
POINT_COUNTS 4 0 0 2

VT 0 0 0 0 0 1 0 0
VT 1 0 0 0 0 1 1 0
VT 1 1 0 0 0 1 1 1
VT 0 1 0 0 0 1 0 1

IDX 0
IDX 3

ATTR_manip_drag_axis hand 0 0 1 0 1 sim/wiper
\tTRIS 0 2
ATTR_manip_none
";

/// Cockpit with 100 vertices and 50 index values in five `IDX10` lines.
fn cockpit_text() -> String {
    let mut s = String::from("I\n800\nOBJ\n\nTEXTURE panel.png\nPOINT_COUNTS 100 0 0 50\n\n");
    for i in 0..100 {
        writeln!(s, "VT {i} 0 0 0 0 1 0 0").unwrap();
    }
    s.push('\n');
    for line in 0..5 {
        let values: Vec<String> = (0..10).map(|k| (line * 10 + k).to_string()).collect();
        writeln!(s, "IDX10 {}", values.join(" ")).unwrap();
    }
    s.push_str("\nATTR_LOD 0 1000\nTRIS 0 50\n");
    s
}

struct Fixture {
    _dir: TempDir,
    acf: PathBuf,
    manip: PathBuf,
    cockpit: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let acf = dir.path().join("plane.acf");
        let manip = dir.path().join("wiper1_manip.obj");
        let cockpit = dir.path().join("cockpit.obj");
        fs::write(&acf, ACF).unwrap();
        fs::write(&manip, MANIP).unwrap();
        fs::write(&cockpit, cockpit_text()).unwrap();
        Self { _dir: dir, acf, manip, cockpit }
    }

    fn merge(&self, opts: &MergeOptions) -> Result<MergeReport> {
        merge(&self.acf, "wiper1", &self.manip, &self.cockpit, opts)
    }

    fn cockpit_lines(&self) -> Vec<String> {
        read_lines(&self.cockpit)
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path).unwrap().lines().map(str::to_string).collect()
}

fn position(lines: &[String], wanted: &str) -> usize {
    lines
        .iter()
        .position(|l| l == wanted)
        .unwrap_or_else(|| panic!("line not found: {wanted}"))
}

#[test]
fn test_header_and_rebase() {
    let fx = Fixture::new();
    let report = fx.merge(&MergeOptions::default()).expect("merge failed");

    assert_eq!(report.splice.original, PointCounts::new(100, 0, 0, 50));
    assert_eq!(report.splice.merged, PointCounts::new(104, 0, 0, 52));
    assert!((report.placement.offset_z - 3.048).abs() < 1e-12);

    let lines = fx.cockpit_lines();
    assert!(lines.contains(&"POINT_COUNTS 104 0 0 52".to_string()));
    assert!(lines.contains(&"IDX 100".to_string()));
    assert!(lines.contains(&"IDX 103".to_string()));
    assert!(lines.contains(&"\tTRIS 50 2".to_string()));
    // original draw call untouched
    assert!(lines.contains(&"TRIS 0 50".to_string()));
    // translated by 10 ft along z
    assert!(lines.contains(&format!(
        "VT\t{:.8}\t{:.8}\t{:.8}\t{:.8}\t{:.8}\t{:.8}\t{:.8}\t{:.8}",
        1.0, 1.0, 3.048, 0.0, 0.0, 1.0, 1.0, 1.0
    )));
}

#[test]
fn test_splice_order() {
    let fx = Fixture::new();
    let original = read_lines(&fx.cockpit);
    let report = fx.merge(&MergeOptions::default()).unwrap();
    let lines = fx.cockpit_lines();

    // summary right before the header
    let header = position(&lines, "POINT_COUNTS 104 0 0 52");
    assert_eq!(lines[header - 1], "# KITBASH - wiper1 VTs: 4 TRIs: 2");

    // fragment vertices directly after the last original vertex
    let vt_start = position(&lines, "# KITBASH - wiper1 VT start");
    assert_eq!(lines[vt_start - 1], "VT 99 0 0 0 0 1 0 0");
    assert!(lines[vt_start + 1..vt_start + 5].iter().all(|l| l.starts_with("VT\t")));
    assert_eq!(lines[vt_start + 5], "# KITBASH - wiper1 VT end");
    assert_eq!(report.splice.vertex_block_line, vt_start + 1);

    // index block directly after the last original index line
    let idx_start = position(&lines, "# KITBASH - wiper1 IDX start");
    assert!(lines[idx_start - 1].starts_with("IDX10 40 41"));
    assert_eq!(lines[idx_start + 3], "# KITBASH - wiper1 IDX end");

    // footer and trailer last
    let anim_start = position(&lines, "# KITBASH - wiper1 ANIM start");
    assert_eq!(lines[anim_start - 1], "TRIS 0 50");
    assert_eq!(lines.last().map(String::as_str), Some(DEFAULT_TRAILER));
    assert_eq!(lines[lines.len() - 2], "# KITBASH - wiper1 ANIM end");

    // every original line survives in order, only the header changes
    let expected: Vec<String> = original
        .iter()
        .map(|l| if l == "POINT_COUNTS 100 0 0 50" { "POINT_COUNTS 104 0 0 52".to_string() } else { l.clone() })
        .collect();
    let kept: Vec<String> = lines[..anim_start]
        .iter()
        .filter(|l| !l.starts_with("# KITBASH") && !l.starts_with("VT\t"))
        .filter(|l| !matches!(l.as_str(), "IDX 100" | "IDX 103"))
        .cloned()
        .collect();
    assert_eq!(kept, expected);
}

#[test]
fn test_backup_created() {
    let fx = Fixture::new();
    let original = fs::read_to_string(&fx.cockpit).unwrap();
    fs::write(backup_path(&fx.cockpit, 1), "older").unwrap();

    let report = fx.merge(&MergeOptions::default()).unwrap();
    assert_eq!(report.backup, backup_path(&fx.cockpit, 2));
    assert_eq!(fs::read_to_string(&report.backup).unwrap(), original);
}

#[test]
fn test_second_run_needs_overwrite() {
    let fx = Fixture::new();
    fx.merge(&MergeOptions::default()).unwrap();
    let merged = fs::read_to_string(&fx.cockpit).unwrap();

    let err = fx.merge(&MergeOptions::default()).unwrap_err();
    assert!(matches!(err, Error::AlreadyMerged(ref n) if n == "wiper1"));
    // nothing written, no new backup
    assert_eq!(fs::read_to_string(&fx.cockpit).unwrap(), merged);
    assert!(!backup_path(&fx.cockpit, 2).exists());
}

#[test]
fn test_name_case_does_not_duplicate() {
    let fx = Fixture::new();
    fx.merge(&MergeOptions::default()).unwrap();
    let merged = fs::read_to_string(&fx.cockpit).unwrap();

    let err = merge(&fx.acf, "Wiper1", &fx.manip, &fx.cockpit, &MergeOptions::default()).unwrap_err();
    assert!(matches!(err, Error::AlreadyMerged(_)));
    assert_eq!(fs::read_to_string(&fx.cockpit).unwrap(), merged);

    let opts = MergeOptions::default().with_overwrite(true);
    let report = merge(&fx.acf, "Wiper1", &fx.manip, &fx.cockpit, &opts).unwrap();
    assert!(report.splice.replaced);
    let lines = fx.cockpit_lines();
    assert!(lines.contains(&"POINT_COUNTS 104 0 0 52".to_string()));
    let vt_blocks = lines.iter().filter(|l| l.to_lowercase() == "# kitbash - wiper1 vt start").count();
    assert_eq!(vt_blocks, 1);
}

#[test]
fn test_overwrite_replaces_in_place() {
    let fx = Fixture::new();
    fx.merge(&MergeOptions::default()).unwrap();
    let merged = fs::read_to_string(&fx.cockpit).unwrap();

    let report = fx.merge(&MergeOptions::default().with_overwrite(true)).unwrap();
    assert!(report.splice.replaced);
    assert_eq!(report.splice.merged, PointCounts::new(104, 0, 0, 52));
    assert_eq!(fs::read_to_string(&fx.cockpit).unwrap(), merged);
    assert_eq!(report.backup, backup_path(&fx.cockpit, 2));
}

#[test]
fn test_moved_placement_replaces_vertices() {
    let fx = Fixture::new();
    fx.merge(&MergeOptions::default()).unwrap();

    fs::write(&fx.acf, ACF.replace("_z_acf_prt_ref 10.0", "_z_acf_prt_ref 0.0")).unwrap();
    fx.merge(&MergeOptions::default().with_overwrite(true)).unwrap();

    let lines = fx.cockpit_lines();
    let vt_start = position(&lines, "# KITBASH - wiper1 VT start");
    assert!(lines[vt_start + 1].starts_with("VT\t0.00000000\t0.00000000\t0.00000000\t"));
    assert_eq!(lines.iter().filter(|l| l.as_str() == "IDX 100").count(), 1);
    assert_eq!(lines.iter().filter(|l| l.as_str() == DEFAULT_TRAILER).count(), 1);
}

#[test]
fn test_missing_object() {
    let fx = Fixture::new();
    let before = fs::read_to_string(&fx.cockpit).unwrap();
    let err = merge(&fx.acf, "throttle", &fx.manip, &fx.cockpit, &MergeOptions::default()).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(err.exit_code(), 3);
    assert_eq!(fs::read_to_string(&fx.cockpit).unwrap(), before);
}

#[test]
fn test_incomplete_placement_writes_nothing() {
    let fx = Fixture::new();
    fs::write(&fx.acf, "P _obja/3/_v10_att_file_stl wiper1.obj\nP _obja/3/_v10_att_psi_ref 45.0\n").unwrap();
    let err = fx.merge(&MergeOptions::default()).unwrap_err();
    assert!(matches!(err, Error::IncompletePlacement { .. }));
    assert!(!backup_path(&fx.cockpit, 1).exists());
}

#[test]
fn test_bad_fragment_writes_nothing() {
    let fx = Fixture::new();
    fs::write(&fx.manip, MANIP.replace("VT 1 1 0 0 0 1 1 1", "VT 1 1 0 0 0 1 1")).unwrap();
    let err = fx.merge(&MergeOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Parse { line: 10, .. }));
    assert!(!backup_path(&fx.cockpit, 1).exists());
}

#[test]
fn test_missing_cockpit() {
    let fx = Fixture::new();
    fs::remove_file(&fx.cockpit).unwrap();
    let err = fx.merge(&MergeOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Analysis { .. }));
}

#[test]
fn test_options_from_settings() {
    let settings = Settings { overwrite: true, backup_limit: 5, trailer: "# KITBASH local".into() };
    let opts = MergeOptions::from(&settings);
    assert!(opts.overwrite);
    assert_eq!(opts.backup_limit, 5);

    let fx = Fixture::new();
    fx.merge(&opts).unwrap();
    assert_eq!(fx.cockpit_lines().last().map(String::as_str), Some("# KITBASH local"));
}

#[test]
fn test_custom_trailer_replaced() {
    let fx = Fixture::new();
    let opts = MergeOptions { trailer: "# merged by shop tooling".into(), ..MergeOptions::default() };
    fx.merge(&opts).unwrap();
    let merged = fs::read_to_string(&fx.cockpit).unwrap();

    fx.merge(&opts.clone().with_overwrite(true)).unwrap();
    assert_eq!(fs::read_to_string(&fx.cockpit).unwrap(), merged);
    let trailers = fx.cockpit_lines().iter().filter(|l| *l == "# merged by shop tooling").count();
    assert_eq!(trailers, 1);
}
