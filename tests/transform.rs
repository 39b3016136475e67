// tests/transform.rs

//! Transform tests: file rewriting, rule files, repository-backed batches.

mod common;

use common::{child_pom, dependencies, pom, workspace, write_file};
use pomrewrite::{
    Config, Repository, TransformContext, TransformEngine, TransformError, TransformOptions,
    TransformRequest,
};
use std::fs;

#[test]
fn test_rule_files_drive_rewrite() {
    let (_temp, _repo, work) = workspace();
    let rules = write_file(
        &work,
        "maven.rules",
        "# pin servlet\njavax.servlet servlet-api * s/.*/2.5/\n",
    );
    let ignore = write_file(&work, "maven.ignoreRules", "junit junit\n");
    let input = write_file(
        &work,
        "pom.xml",
        &pom(
            "com.x",
            "lib",
            "1.0",
            &dependencies(&[
                ("javax.servlet", "servlet-api", Some("2.3")),
                ("junit", "junit", Some("4.13")),
                ("commons-io", "commons-io", Some("2.4")),
            ]),
        ),
    );

    let mut ctx = TransformContext::load(Some(&rules), Some(&ignore), None);
    let outcome = TransformEngine::default()
        .transform_file(&mut ctx, None, &TransformRequest::in_place(&input))
        .unwrap();

    let out = fs::read_to_string(&input).unwrap();
    assert_eq!(out, outcome.output);
    assert!(out.contains("<artifactId>servlet-api</artifactId>\n      <version>2.5</version>"));
    assert!(out.contains("<artifactId>commons-io</artifactId>\n      <version>debian</version>"));
    assert!(!out.contains("junit"));
    assert!(out.contains("<debian.originalVersion>1.0</debian.originalVersion>"));
    assert!(out.contains("<debian.mavenRules>javax.servlet servlet-api * s/.*/2.5/"));
}

#[test]
fn test_missing_rule_files_are_empty() {
    let (_temp, _repo, work) = workspace();
    let ctx = TransformContext::load(
        Some(&work.join("absent.rules")),
        Some(&work.join("absent.ignoreRules")),
        Some(&work.join("absent.publishedRules")),
    );
    assert!(ctx.ignore_rules.is_empty());
    assert!(ctx.published_rules.is_empty());
    // The built-in defaults are always present
    assert!(!ctx.rules.is_empty());
}

#[test]
fn test_inherited_management_with_repository() {
    let (_temp, repo_dir, work) = workspace();
    let management = "  <dependencyManagement>\n".to_string()
        + &dependencies(&[("junit", "junit", Some("4.13"))])
        + "  </dependencyManagement>\n";
    write_file(
        &repo_dir,
        "com/x/parent/1.0/parent-1.0.pom",
        &pom("com.x", "parent", "1.0", &management),
    );
    let input = write_file(
        &work,
        "pom.xml",
        &child_pom(
            ("com.x", "parent", "1.0"),
            "child",
            &dependencies(&[("junit", "junit", None), ("log4j", "log4j", None)]),
        ),
    );

    let mut repo = Repository::new(&repo_dir);
    repo.scan();
    assert_eq!(repo.resolved().count(), 1);

    let mut ctx = TransformContext::default();
    let options = TransformOptions {
        debian_build: true,
        ..TransformOptions::default()
    };
    let outcome = TransformEngine::new(options)
        .transform_file(&mut ctx, Some(&mut repo), &TransformRequest::in_place(&input))
        .unwrap();

    assert!(!outcome.parent_missing);
    let out = &outcome.output;
    assert!(out.contains("<artifactId>junit</artifactId>\n    </dependency>"));
    assert!(out.contains("<artifactId>log4j</artifactId>\n      <version>debian</version>"));
    assert!(repo.is_resolved(&input));
}

#[test]
fn test_batch_continues_after_failure() {
    let (_temp, repo_dir, work) = workspace();
    let good = write_file(&work, "good/pom.xml", &pom("com.x", "good", "1", ""));
    let broken = write_file(&work, "broken/pom.xml", "<project><artifactId>x</version>");
    let orphan = write_file(
        &work,
        "orphan/pom.xml",
        &child_pom(("com.x", "ghost", "1"), "orphan", ""),
    );

    let mut repo = Repository::new(&repo_dir);
    repo.scan();
    let mut ctx = TransformContext::default();
    let engine = TransformEngine::new(TransformOptions {
        require_parent: true,
        ..TransformOptions::default()
    });
    let requests = [
        TransformRequest::in_place(&good),
        TransformRequest::in_place(&broken),
        TransformRequest::in_place(&orphan),
    ];
    let results = engine.transform_all(&mut ctx, Some(&mut repo), &requests);

    assert_eq!(results.len(), 3);
    assert!(results[0].1.is_ok());
    assert!(results[1].1.is_err());
    assert!(matches!(results[2].1, Err(TransformError::MissingParent(_))));

    assert!(fs::read_to_string(&good).unwrap().contains("<version>debian</version>"));
    assert_eq!(fs::read_to_string(&broken).unwrap(), "<project><artifactId>x</version>");
    assert!(fs::read_to_string(&orphan).unwrap().contains("<version>1</version>"));
}

#[test]
fn test_output_and_properties_files() {
    let (_temp, _repo, work) = workspace();
    let source = pom("com.x", "lib", "3.1", "");
    let input = write_file(&work, "pom.xml", &source);
    let output = work.join("target/lib.pom");
    let properties = work.join("target/lib.properties");

    let mut ctx = TransformContext::default();
    let request = TransformRequest::to(&input, &output).with_properties(&properties);
    TransformEngine::new(TransformOptions {
        keep_pom_version: true,
        ..TransformOptions::default()
    })
    .transform_file(&mut ctx, None, &request)
    .unwrap();

    assert_eq!(fs::read_to_string(&input).unwrap(), source);
    let rewritten = fs::read_to_string(&output).unwrap();
    assert!(rewritten.contains("<version>3.1</version>"));
    assert!(rewritten.contains("<debian.hasPackageVersion>true</debian.hasPackageVersion>"));

    let props = fs::read_to_string(&properties).unwrap();
    assert!(props.contains("artifactId=lib\n"));
    assert!(props.contains("version=3.1\n"));
    assert!(props.contains("debianVersion=debian\n"));
    assert!(props.contains("originalVersion=3.1\n"));
}

#[test]
fn test_config_file_options() {
    let (_temp, _repo, work) = workspace();
    let rules = write_file(&work, "maven.rules", "org.x * * s/.*/7/\n");
    let config_path = write_file(
        &work,
        "pomrewrite.toml",
        &format!(
            "[transform]\npackage = \"libx-java\"\n\n[rules]\nrules = \"{}\"\n",
            rules.display()
        ),
    );
    let config = Config::load(&config_path).unwrap();
    let mut ctx = config.context();
    let source = pom("com.x", "app", "1", &dependencies(&[("org.x", "core", Some("6"))]));
    let outcome = TransformEngine::new(config.transform)
        .transform_str(&mut ctx, None, &source, &work.join("pom.xml"))
        .unwrap();

    assert!(outcome.output.contains("<artifactId>core</artifactId>\n      <version>7</version>"));
    assert!(outcome.output.contains("<debian.package>libx-java</debian.package>"));
}
