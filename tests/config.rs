use std::fs;

use pretty_assertions::assert_eq;

use annoc::driver::compile;
use annoc::options::{ModuleKind, ProjectConfig, ScriptTarget};
use annoc::program::DiskHost;
use annoc::Error;

#[test]
fn project_file_becomes_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tsconfig.json");
    fs::write(
        &path,
        r#"{
            "compilerOptions": {
                "module": "commonjs",
                "noImplicitAny": true,
                "removeComments": false,
                "target": "es5",
                "outDir": "build"
            },
            "files": ["src/main.ts", "src/util.ts"]
        }"#,
    )
    .unwrap();

    let project = ProjectConfig::from_file(&path).unwrap();
    assert_eq!(
        project.to_args(),
        vec![
            "--module commonjs",
            "--noImplicitAny",
            "--target es5",
            "--outDir build",
            "src/main.ts",
            "src/util.ts",
        ]
    );

    let options = project.compiler_options().unwrap();
    assert_eq!(options.module, ModuleKind::CommonJs);
    assert_eq!(options.target, ScriptTarget::Es5);
    assert!(options.no_implicit_any);
}

#[test]
fn malformed_project_files_are_config_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tsconfig.json");
    fs::write(&path, "{ \"files\": 3 }").unwrap();

    assert!(matches!(ProjectConfig::from_file(&path), Err(Error::Config { .. })));
    assert!(matches!(
        ProjectConfig::from_file(&dir.path().join("missing.json")),
        Err(Error::Io { .. })
    ));
}

#[test]
fn bad_option_values_name_the_project_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tsconfig.json");
    fs::write(&path, r#"{ "compilerOptions": { "target": "es99", "outDir": "build" } }"#).unwrap();

    let project = ProjectConfig::from_file(&path).unwrap();
    match project.compiler_options() {
        Err(Error::Config { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected a configuration error, got {:?}", other),
    }
}

#[test]
fn compiles_files_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("greeter.ts");
    fs::write(
        &path,
        "class Greeter {\n  greeting: string;\n  greet(name: string): string { return this.greeting + name; }\n}\nexport = Greeter;\n",
    )
    .unwrap();

    let name = path.to_string_lossy().into_owned();
    let outputs = compile(&[name], &Default::default(), &DiskHost).unwrap();

    assert_eq!(outputs.len(), 1);
    assert!(outputs[0].file_name.ends_with("greeter.js"));
    assert!(!outputs[0].write_byte_order_mark);

    let text = &outputs[0].text;
    assert!(text.contains("/** @type {string} */\nthis.greeting;"));
    assert!(text.contains("/** @returns {string}\n  * @param {string} name\n */\nGreeter.prototype.greet = function (name)"));
    assert!(!text.contains("module.exports"));
}

#[test]
fn unreadable_inputs_fail_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let name = dir.path().join("absent.ts").to_string_lossy().into_owned();

    assert!(matches!(
        compile(&[name], &Default::default(), &DiskHost),
        Err(Error::Io { .. })
    ));
}
