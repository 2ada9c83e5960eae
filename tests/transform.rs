//! End-to-end tests for the `tsc` transform.
//!
//! Each test runs whole programs through the pass with deterministic
//! placeholder tokens and inspects the printed output or the output tree.

use ts_transform_creator::compiler::{parse_fragment, parse_module, print};
use ts_transform_creator::factory::evaluate;
use ts_transform_creator::query::query;
use ts_transform_creator::{
    DiagnosticKind, FileOutcome, FileOutput, ModuleFormat, Program, ProgramFile, SequentialIds,
    Severity, TransformErrorKind, TransformOptions, transform_program_with_ids,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn run(program: &Program, options: &TransformOptions) -> Vec<FileOutcome> {
    transform_program_with_ids(program, options, &SequentialIds::new())
}

fn transform_with(source: &str, options: &TransformOptions) -> FileOutput {
    let program = Program::single("input.ts", source).unwrap();
    run(&program, options).remove(0).result.unwrap()
}

fn transform(source: &str) -> FileOutput {
    transform_with(source, &TransformOptions::default())
}

fn count(output: &FileOutput, selector: &str) -> usize {
    query(&output.tree, selector).unwrap().len()
}

const TAG_IMPORT: &str = r#"import { tsc } from "ts-transform-creator";"#;

// =============================================================================
// Transformer behaviour
// =============================================================================

mod transformer {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn removes_tagged_template_literal() {
        let output = transform(&format!("{TAG_IMPORT}\ntsc``\n"));
        assert_eq!(count(&output, r#"TaggedTemplateExpression Identifier[name="ts"]"#), 0);
        assert_eq!(count(&output, "TaggedTemplateExpression"), 0);
        assert_eq!(output.expansions, 1);
    }

    #[test]
    fn retains_unrelated_tagged_template_literal() {
        let output = transform(
            r#"import { tsc as other } from "ts-transform-creator";
const ts = (strings: TemplateStringsArray): any => strings;
ts``
"#,
        );
        assert_eq!(count(&output, r#"TaggedTemplateExpression Identifier[name="ts"]"#), 1);
        assert_eq!(output.expansions, 0);
    }

    #[test]
    fn removes_tagged_template_literal_with_renamed_import() {
        let output = transform(
            r#"import { tsc as other } from "ts-transform-creator";
other``
"#,
        );
        assert_eq!(count(&output, "TaggedTemplateExpression"), 0);
        assert_eq!(output.expansions, 1);
    }

    #[test]
    fn works_for_static_template_strings() {
        let output = transform(&format!("{TAG_IMPORT}\ntsc`\"Hello, World!\"`\n"));
        assert_eq!(
            count(&output, r#"ArrowFunction:has(StringLiteral[value="Hello, World!"])"#),
            1
        );
    }

    #[test]
    fn works_for_string_interpolations() {
        let output = transform(&format!(
            "import ts from \"typescript\";\n{TAG_IMPORT}\nexport const create = tsc<{{ name: string }}>`console.log(${{(props) => ts.createStringLiteral('Hello, ' + props.name + 'World!')}})`;\n"
        ));
        let printed = output.print();
        assert!(
            printed.contains("ts.createStringLiteral('Hello, ' + props.name + 'World!')"),
            "{printed}"
        );
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    }
}

// =============================================================================
// Properties
// =============================================================================

mod properties {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn file_without_facility_import_is_unchanged() {
        let source = "const ts = (s: TemplateStringsArray) => s;\nexport const a = tsc`x`;\nts`y`;\n";
        let output = transform(source);
        assert_eq!(output.tree, parse_module(source).unwrap());
        assert_eq!(output.print(), print(&parse_module(source).unwrap()));
        assert_eq!(output.expansions, 0);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn no_tracked_invocation_remains() {
        let output = transform(&format!(
            "{TAG_IMPORT}\nconst a = tsc`f()`;\nfunction g() {{ return [tsc`x`, tsc`y`]; }}\n"
        ));
        assert_eq!(count(&output, "TaggedTemplateExpression"), 0);
        assert_eq!(output.expansions, 3);
    }

    #[test]
    fn shadowing_binding_is_left_alone() {
        let output = transform(&format!(
            "{TAG_IMPORT}\nfunction f(tsc) {{ return tsc`x`; }}\nconst y = tsc`y`;\n"
        ));
        assert_eq!(output.expansions, 1);
        let remaining = query(&output.tree, "FunctionDeclaration TaggedTemplateExpression")
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(count(&output, "TaggedTemplateExpression"), 1);
    }

    #[test]
    fn aliased_import_transforms_the_same() {
        let direct = transform(&format!("{TAG_IMPORT}\nconst a = tsc`f(1, 'x')`;\n"));
        let aliased = transform(
            "import { tsc as quote } from \"ts-transform-creator\";\nconst a = quote`f(1, 'x')`;\n",
        );
        let statement = |output: &FileOutput| {
            print(query(&output.tree, "VariableStatement").unwrap()[0])
        };
        assert_eq!(statement(&aliased), statement(&direct));
    }

    #[test]
    fn empty_template_builds_an_empty_statement() {
        let output = transform(&format!("{TAG_IMPORT}\nconst a = tsc``;\n"));
        assert!(
            output
                .print()
                .contains("const a = (props) => ts.createEmptyStatement();")
        );
    }

    #[test]
    fn static_template_rebuilds_its_text() {
        let text = "if (ready) { f(\"a\", [1, 2]); } else return;";
        let output = transform(&format!("{TAG_IMPORT}\nconst a = tsc`{text}`;\n"));
        let arrow = query(&output.tree, "ArrowFunction").unwrap()[0];
        let rebuilt = evaluate(arrow.child("body").unwrap(), "ts").unwrap();
        let expected = parse_fragment(text).unwrap();
        assert_eq!(&rebuilt, &expected.list("statements")[0]);
    }

    #[test]
    fn string_substitution_is_invoked_with_the_parameter() {
        let output = transform(&format!(
            "import ts from \"typescript\";\n{TAG_IMPORT}\nconst a = tsc`log(${{(p) => ts.createStringLiteral(p.name)}})`;\n"
        ));
        let printed = output.print();
        assert!(
            printed.contains(
                "(props) => ts.createCallExpression(ts.createIdentifier(\"log\"), [], [((p) => ts.createStringLiteral(p.name))(props)])"
            ),
            "{printed}"
        );
        assert!(!printed.contains("createStringLiteral(\"__tsc"));
    }

    #[test]
    fn nested_invocations_expand_in_one_pass() {
        let output = transform(&format!(
            "import ts from \"typescript\";\n{TAG_IMPORT}\nconst outer = tsc`f(${{(p) => tsc`g()`}})`;\n"
        ));
        assert_eq!(count(&output, "TaggedTemplateExpression"), 0);
        assert_eq!(output.expansions, 2);
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let printed = output.print();
        assert!(
            printed.contains(
                "((p) => (props) => ts.createCallExpression(ts.createIdentifier(\"g\"), [], []))(props)"
            ),
            "{printed}"
        );
    }

    #[test]
    fn directly_nested_invocation_is_an_expression() {
        let output = transform(&format!(
            "import ts from \"typescript\";\n{TAG_IMPORT}\nconst outer = tsc`f(${{tsc`g()`}})`;\n"
        ));
        assert_eq!(output.expansions, 2);
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        assert_eq!(count(&output, "TaggedTemplateExpression"), 0);
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let first = transform(&format!(
            "import ts from \"typescript\";\n{TAG_IMPORT}\nconst a = tsc`f(${{(p) => ts.createIdentifier(\"x\")}})`;\nconst b = tsc``;\n"
        ));
        let printed = first.print();
        let second = transform(&printed);
        assert_eq!(second.expansions, 0);
        assert_eq!(second.print(), printed);
    }
}

// =============================================================================
// Assembly and options
// =============================================================================

mod assembly {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn factory_import_is_inserted_once() {
        let output = transform(&format!("{TAG_IMPORT}\nconst a = tsc`x`;\n"));
        let printed = output.print();
        assert!(printed.starts_with("import ts from \"typescript\";\n"), "{printed}");
        assert!(printed.contains("const a = (props) => ts.createIdentifier(\"x\");"));

        let output = transform(&format!(
            "import ts from \"typescript\";\n{TAG_IMPORT}\nconst a = tsc`x`;\n"
        ));
        assert_eq!(output.print().matches("import ts from").count(), 1);
    }

    #[test]
    fn factory_import_can_be_turned_off() {
        let options = TransformOptions {
            insert_factory_import: false,
            ..TransformOptions::default()
        };
        let output = transform_with(&format!("{TAG_IMPORT}\nconst a = tsc`x`;\n"), &options);
        assert!(!output.print().contains("import ts from"));
        assert_eq!(output.expansions, 1);
    }

    #[test]
    fn foreign_namespace_binding_suppresses_the_import_with_a_warning() {
        let output = transform("import { tsc as ts } from \"ts-transform-creator\";\nconst a = ts`x`;\n");
        assert_eq!(output.expansions, 1);
        assert!(!output.print().contains("from \"typescript\""), "{}", output.print());
        let kinds: Vec<_> = output
            .diagnostics
            .iter()
            .map(|diagnostic| (diagnostic.severity, diagnostic.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![(Severity::Warning, DiagnosticKind::FactoryNamespaceShadowed)]
        );
        let location = output.diagnostics[0].location.as_ref().unwrap();
        assert_eq!((location.line, location.column), (1, 10));

        let output = transform(&format!(
            "import * as ts from \"typescript\";\n{TAG_IMPORT}\nconst a = tsc`x`;\n"
        ));
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    }

    #[test]
    fn no_import_without_expansions() {
        let output = transform(&format!("{TAG_IMPORT}\nconst a = 1;\n"));
        assert!(!output.print().contains("typescript"));
    }

    #[test]
    fn commonjs_requires_the_factory_module() {
        let options = TransformOptions {
            module_format: ModuleFormat::CommonJs,
            ..TransformOptions::default()
        };
        let output = transform_with(&format!("{TAG_IMPORT}\nconst a = tsc`x`;\n"), &options);
        let printed = output.print();
        assert!(!printed.contains("import ts from"), "{printed}");
        assert!(printed.contains("const a = (props) => {"), "{printed}");
        assert!(printed.contains("const ts = require(\"typescript\");"), "{printed}");
        assert!(printed.contains("return ts.createIdentifier(\"x\");"), "{printed}");
    }

    #[test]
    fn options_from_plugin_json() {
        let options = TransformOptions::from_json(
            r#"{ "moduleSpecifier": "my-quote", "factoryNamespace": "f", "parameterName": "args" }"#,
        )
        .unwrap();
        let output = transform_with(
            "import { tsc } from \"my-quote\";\nconst a = tsc`x`;\nconst b = 1;\n",
            &options,
        );
        let printed = output.print();
        assert!(printed.starts_with("import f from \"typescript\";"), "{printed}");
        assert!(printed.contains("const a = (args) => f.createIdentifier(\"x\");"), "{printed}");
    }
}

// =============================================================================
// Programs and diagnostics
// =============================================================================

mod programs {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn files_are_independent() {
        let program = Program::new(vec![
            ProgramFile::parse("good.ts", format!("{TAG_IMPORT}\nconst a = tsc`x`;\n")).unwrap(),
            ProgramFile::parse("bad.ts", format!("{TAG_IMPORT}\ntsc`const = 1;`;\n")).unwrap(),
            ProgramFile::parse("plain.ts", "f();\n").unwrap(),
        ]);
        let outcomes = run(&program, &TransformOptions::default());
        let files: Vec<_> = outcomes.iter().map(|outcome| outcome.file.as_str()).collect();
        assert_eq!(files, vec!["good.ts", "bad.ts", "plain.ts"]);

        assert_eq!(outcomes[0].result.as_ref().unwrap().expansions, 1);
        assert_eq!(outcomes[2].result.as_ref().unwrap().expansions, 0);

        let err = outcomes[1].result.as_ref().unwrap_err();
        assert!(matches!(
            &err.kind,
            TransformErrorKind::FragmentParseFailure { fragment, .. } if fragment == "const = 1;"
        ));
        assert_eq!(err.location.as_ref().unwrap().to_string(), "bad.ts:2:1");
        let rendered = err.to_string();
        assert!(rendered.starts_with("template is not valid syntax at bad.ts:2:1"), "{rendered}");
        assert!(rendered.contains("--> bad.ts:2:"), "{rendered}");
        assert!(rendered.contains("2 | const = 1;"), "{rendered}");
        let diagnostic = err.to_diagnostic();
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.kind, DiagnosticKind::FragmentParseFailure);
    }

    #[test]
    fn substitution_roles_resolve_across_files() {
        let program = Program::new(vec![
            ProgramFile::parse(
                "factories.ts",
                "import ts from \"typescript\";\nexport const name = (p) => ts.createIdentifier(\"x\");\n",
            )
            .unwrap(),
            ProgramFile::parse(
                "main.ts",
                format!("{TAG_IMPORT}\nimport {{ name }} from \"./factories\";\nconst a = tsc`const ${{name}} = 1;`;\n"),
            )
            .unwrap(),
        ]);
        let outcomes = run(&program, &TransformOptions::default());
        let output = outcomes[1].result.as_ref().unwrap();
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        assert!(
            output.print().contains(
                "ts.createVariableDeclaration(name(props), undefined, ts.createNumericLiteral(\"1\"))"
            ),
            "{}",
            output.print()
        );
    }

    #[test]
    fn misplaced_substitution_is_reported_and_left_in_place() {
        let output = transform(&format!(
            "import ts from \"typescript\";\n{TAG_IMPORT}\nconst i = (p) => ts.createIdentifier(\"x\");\nconst a = tsc`f(\"${{i}}\")`;\n"
        ));
        let printed = output.print();
        assert!(printed.contains("createStringLiteral(\"__tsc0\""), "{printed}");
        let kinds: Vec<_> = output
            .diagnostics
            .iter()
            .map(|diagnostic| (diagnostic.severity, diagnostic.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![(Severity::Warning, DiagnosticKind::SplicePatternMismatch)]
        );
        let location = output.diagnostics[0].location.as_ref().unwrap();
        assert_eq!((location.line, location.column), (4, 20));
    }

    #[test]
    fn untyped_substitutions_degrade_with_warnings() {
        let output = transform(&format!("{TAG_IMPORT}\nconst n = 1;\ntsc`f(${{missing}}, ${{n}})`;\n"));
        let kinds: Vec<_> = output
            .diagnostics
            .iter()
            .map(|diagnostic| (diagnostic.severity, diagnostic.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (Severity::Warning, DiagnosticKind::UnresolvedSubstitutionType),
                (Severity::Warning, DiagnosticKind::MissingReturnTypeSignature),
            ]
        );
        let location = output.diagnostics[0].location.as_ref().unwrap();
        assert_eq!((location.line, location.column), (3, 9));
        // Degraded substitutions are still spliced as expressions.
        assert!(output.print().contains("[missing(props), n(props)]"));
    }
}
