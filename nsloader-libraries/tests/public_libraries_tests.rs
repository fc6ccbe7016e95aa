use nsloader_libraries::{LibraryConfigError, LibrarySet, PublicLibraries};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

// ── from_partition_root ─────────────────────────────────────────

#[test]
fn partition_root_loads_all_sets() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "system/etc/public.libraries.txt", "libc.so\nlibm.so\nlibdl.so\n");
    write(root, "system/etc/llndk.libraries.txt", "libvndksupport.so\nlibsync.so\n");
    write(root, "system/etc/vndksp.libraries.txt", "libbase.so\n");
    write(root, "vendor/etc/public.libraries.txt", "libvendorfoo.so\n");

    let libs = PublicLibraries::from_partition_root(root).unwrap();

    assert_eq!(libs.default_public().to_string(), "libc.so:libm.so:libdl.so");
    assert_eq!(libs.llndk().to_string(), "libvndksupport.so:libsync.so");
    assert_eq!(libs.vndksp().to_string(), "libbase.so");
    assert_eq!(libs.vendor_public().to_string(), "libvendorfoo.so");
    assert!(libs.extended_public().is_empty());
    assert!(!libs.runtime_public().is_empty());
}

#[test]
fn partition_root_requires_default_list() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "vendor/etc/public.libraries.txt", "libvendorfoo.so\n");

    let err = PublicLibraries::from_partition_root(dir.path()).unwrap_err();
    assert!(matches!(err, LibraryConfigError::MissingConfig(_)));
}

#[test]
fn partition_root_optional_lists_default_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "system/etc/public.libraries.txt", "libc.so\n");

    let libs = PublicLibraries::from_partition_root(dir.path()).unwrap();
    assert!(libs.vendor_public().is_empty());
    assert!(libs.llndk().is_empty());
    assert!(libs.vndksp().is_empty());
}

// ── Extended (company) lists ────────────────────────────────────

#[test]
fn extended_lists_are_merged_in_company_order() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "system/etc/public.libraries.txt", "libc.so\n");
    write(root, "system/etc/public.libraries-zeta.txt", "libcam.zeta.so\n");
    write(root, "system/etc/public.libraries-acme.txt", "libfoo.acme.so\nlibbar.acme.so\n");

    let libs = PublicLibraries::from_partition_root(root).unwrap();
    assert_eq!(
        libs.extended_public().to_string(),
        "libfoo.acme.so:libbar.acme.so:libcam.zeta.so"
    );
}

#[test]
fn extended_library_without_company_suffix_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "system/etc/public.libraries.txt", "libc.so\n");
    write(root, "system/etc/public.libraries-acme.txt", "libfoo.acme.so\nlibsneaky.so\n");

    let err = PublicLibraries::from_partition_root(root).unwrap_err();
    match err {
        LibraryConfigError::InvalidCompanyLibrary { soname, company, .. } => {
            assert_eq!(soname, "libsneaky.so");
            assert_eq!(company, "acme");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn files_that_only_look_like_extended_lists_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "system/etc/public.libraries.txt", "libc.so\n");
    write(root, "system/etc/public.libraries-.txt", "libnope.so\n");
    write(root, "system/etc/public.libraries-acme.conf", "libnope.so\n");

    let libs = PublicLibraries::from_partition_root(root).unwrap();
    assert!(libs.extended_public().is_empty());
}

// ── TOML loading ────────────────────────────────────────────────

#[test]
fn load_from_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("libraries.toml");
    fs::write(
        &path,
        r#"
default = ["libc.so", "libm.so"]
extended = ["libfoo.acme.so"]
runtime = ["libicuuc.so"]
vendor = ["libvendorfoo.so"]
vndksp = ["libbase.so"]
llndk = ["libvndksupport.so"]
"#,
    )
    .unwrap();

    let libs = PublicLibraries::load_from(&path).unwrap();
    let expected = PublicLibraries::default()
        .with_default(LibrarySet::parse("libc.so:libm.so"))
        .with_extended(LibrarySet::parse("libfoo.acme.so"))
        .with_runtime(LibrarySet::parse("libicuuc.so"))
        .with_vendor(LibrarySet::parse("libvendorfoo.so"))
        .with_vndksp(LibrarySet::parse("libbase.so"))
        .with_llndk(LibrarySet::parse("libvndksupport.so"));
    assert_eq!(libs, expected);
}

#[test]
fn load_from_missing_toml_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = PublicLibraries::load_from(&dir.path().join("nope.toml")).unwrap_err();
    assert!(err.to_string().contains("nope.toml"));
}

#[test]
fn load_from_malformed_toml_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("libraries.toml");
    fs::write(&path, "default = [[[").unwrap();

    let err = PublicLibraries::load_from(&path).unwrap_err();
    assert!(matches!(err, LibraryConfigError::Toml(_)));
}
