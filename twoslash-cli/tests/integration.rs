#![allow(clippy::expect_used, reason = "Fine in tests")]
use std::{fs, path::Path, sync::Arc};

use tempfile::{TempDir, tempdir};
use twoslash_cli::convert::{ConversionRequest, Converter};
use twoslash_commonmark::{
  CheckReport,
  Diagnostic,
  MarkdownOptions,
  MarkdownProcessor,
  TypeChecker,
  twoslash::{checker::CheckError, markup::TwoslashSample},
};

/// Reports TS2322 on the first line of every sample.
struct AssignabilityChecker;

impl TypeChecker for AssignabilityChecker {
  fn name(&self) -> &str {
    "assignability"
  }

  fn check(&self, _sample: &TwoslashSample) -> Result<CheckReport, CheckError> {
    Ok(CheckReport {
      diagnostics: vec![Diagnostic {
        line:    0,
        column:  6,
        code:    2322,
        message: "Type 'number' is not assignable to type 'string'.".into(),
      }],
      answers:     Vec::new(),
    })
  }
}

fn converter(dir: &TempDir) -> Converter {
  Converter::new(
    MarkdownProcessor::new(MarkdownOptions::default()),
    dir.path().join("scratch"),
  )
}

fn write(path: &Path, content: &str) {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).expect("Failed to create dir in test");
  }
  fs::write(path, content).expect("Failed to write file in test");
}

fn read(path: &Path) -> String {
  fs::read_to_string(path).expect("Failed to read file in test")
}

#[test]
fn test_markdown_to_html_file() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let from = temp_dir.path().join("guide.md");
  write(&from, "# Guide\n\nVisible prose.\n\n```ts\nconst a = 1;\n```\n");
  let to = temp_dir.path().join("site/out.html");

  converter(&temp_dir)
    .run(&ConversionRequest::new(&from, &to))
    .expect("Failed to convert guide.md");

  let html = read(&to);
  assert!(html.contains("<p>Visible prose.</p>"));
  assert!(html.contains("<pre class=\"shiki"));
}

#[test]
fn test_markdown_to_directory() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let from = temp_dir.path().join("guide.md");
  write(&from, "Hello\n");
  let to = temp_dir.path().join("out");

  converter(&temp_dir)
    .run(&ConversionRequest::new(&from, &to))
    .expect("Failed to convert guide.md");

  assert_eq!(read(&to.join("guide.html")), "<p>Hello</p>\n");
}

#[test]
fn test_split_out_code_samples() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let from = temp_dir.path().join("samples.md");
  write(
    &from,
    "Intro\n\n```ts\nlet one;\n```\n\n<aside>two</aside>\n\n```js\nlet \
     three;\n```\n",
  );
  let to = temp_dir.path().join("out");

  converter(&temp_dir)
    .run(&ConversionRequest {
      split_out_code_samples: true,
      ..ConversionRequest::new(&from, &to)
    })
    .expect("Failed to split samples.md");

  let mds = to.join("mds");
  assert!(read(&mds.join("code-1.html")).contains("one"));
  assert_eq!(read(&mds.join("code-2.html")).trim(), "<aside>two</aside>");
  assert!(read(&mds.join("code-3.html")).contains("three"));
  assert!(!mds.join("code-4.html").exists());
  assert!(!read(&mds.join("code-1.html")).contains("Intro"));
}

#[test]
fn test_lint_writes_nothing() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let from = temp_dir.path().join("guide.md");
  write(&from, "```ts twoslash\nconst a = 1;\n```\n");
  let to = temp_dir.path().join("out");

  converter(&temp_dir)
    .run(&ConversionRequest {
      lint: true,
      split_out_code_samples: true,
      ..ConversionRequest::new(&from, &to)
    })
    .expect("Failed to lint guide.md");

  assert!(!to.exists());
}

#[test]
fn test_lint_without_checker_validates_markup_only() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let from = temp_dir.path().join("types.md");
  write(&from, "```ts twoslash\nconst a: string = 1;\n```\n");
  let to = temp_dir.path().join("out");
  let converter = converter(&temp_dir);
  assert!(!converter.checks_types());

  let request = ConversionRequest {
    lint: true,
    ..ConversionRequest::new(&from, &to)
  };
  converter.run(&request).expect("Markup-only linting should pass");
  assert!(!to.exists());

  write(&from, "```ts twoslash\n// @errors: nope\nlet a;\n```\n");
  assert!(converter.run(&request).is_err());
}

#[test]
fn test_lint_with_checker_reports_type_errors() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let from = temp_dir.path().join("types.md");
  write(&from, "```ts twoslash\nconst a: string = 1;\n```\n");
  let to = temp_dir.path().join("out");
  let converter = Converter::new(
    MarkdownProcessor::new(MarkdownOptions::default())
      .with_checker(Arc::new(AssignabilityChecker)),
    temp_dir.path().join("scratch"),
  );
  assert!(converter.checks_types());

  let err = converter
    .run(&ConversionRequest {
      lint: true,
      ..ConversionRequest::new(&from, &to)
    })
    .expect_err("An undeclared type error should fail linting");
  assert!(format!("{err:?}").contains("2322"));
  assert!(!to.exists());
}

#[test]
fn test_html_destination_is_a_file_even_if_a_directory_exists() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let from = temp_dir.path().join("guide.md");
  write(&from, "Hello\n");
  let to = temp_dir.path().join("out.html");
  fs::create_dir(&to).expect("Failed to create dir in test");

  let result = converter(&temp_dir).run(&ConversionRequest::new(&from, &to));
  assert!(result.is_err());
  assert!(!to.join("guide.html").exists());
}

#[test]
fn test_bad_settings_name_path_and_literal() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let from = temp_dir.path().join("bad.md");
  write(&from, "<!-- twoslash: {bad syntax -->\n\nText\n");
  let to = temp_dir.path().join("out");

  let err = converter(&temp_dir)
    .run(&ConversionRequest::new(&from, &to))
    .expect_err("Invalid settings should fail");

  let report = format!("{err:?}");
  assert!(report.contains("bad.md"), "{report}");
  assert!(report.contains("{bad syntax"), "{report}");
  assert!(!to.exists());
}

#[test]
fn test_typescript_source() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let from = temp_dir.path().join("src/sample.ts");
  write(&from, "// twoslash: {theme: 'Nord'}\nconst answer = 42;\n");
  let to = temp_dir.path().join("out");

  converter(&temp_dir)
    .run(&ConversionRequest::new(&from, &to))
    .expect("Failed to convert sample.ts");

  let scratch = read(&temp_dir.path().join("scratch/sample.ts.md"));
  assert!(
    scratch
      .starts_with("<!-- twoslash: {theme: 'Nord'} -->\n```ts twoslash\n")
  );
  assert!(!scratch.contains("// twoslash:"));

  let html = read(&to.join("sample.ts.html"));
  assert!(html.contains("shiki nord twoslash lsp"));
  assert!(html.contains("answer"));
  assert!(!to.join("sample.ts_src.html").exists());
}

#[test]
fn test_also_render_source() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let from = temp_dir.path().join("sample.tsx");
  write(&from, "const a = <div />;\n");
  let to = temp_dir.path().join("out");

  converter(&temp_dir)
    .run(&ConversionRequest {
      also_render_source: true,
      ..ConversionRequest::new(&from, &to)
    })
    .expect("Failed to convert sample.tsx");

  let scratch = temp_dir.path().join("scratch");
  assert!(read(&scratch.join("sample.tsx.md")).contains("```tsx twoslash\n"));
  assert!(!read(&scratch.join("sample.tsx_src.md")).contains("twoslash"));

  assert!(read(&to.join("sample.tsx.html")).contains("twoslash lsp"));
  assert!(!read(&to.join("sample.tsx_src.html")).contains("twoslash lsp"));
}

#[test]
fn test_unconvertible_files_are_skipped() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let to = temp_dir.path().join("out");
  let converter = converter(&temp_dir);

  for name in ["notes.txt", ".hidden.md"] {
    let from = temp_dir.path().join(name);
    write(&from, "Hello\n");
    converter
      .run(&ConversionRequest::new(&from, &to))
      .expect("Skipping should succeed");
  }
  assert!(!to.exists());
}

#[test]
fn test_missing_source_fails() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let result = converter(&temp_dir).run(&ConversionRequest::new(
    temp_dir.path().join("missing.md"),
    temp_dir.path().join("out"),
  ));
  assert!(result.is_err());
}

#[test]
fn test_directory_source() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let from = temp_dir.path().join("docs");
  write(&from.join("a.md"), "First\n");
  write(&from.join("b.js"), "let b;\n");
  write(&from.join("c.txt"), "ignored\n");
  write(&from.join("nested/d.md"), "Nested\n");
  let to = temp_dir.path().join("out");

  converter(&temp_dir)
    .run(&ConversionRequest::new(&from, &to))
    .expect("Failed to convert docs/");

  assert!(read(&to.join("a.html")).contains("First"));
  assert!(to.join("b.js.html").exists());
  assert!(!to.join("c.html").exists());
  assert!(!to.join("d.html").exists());
}
