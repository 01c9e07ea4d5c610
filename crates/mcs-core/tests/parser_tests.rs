//! End-to-end parsing tests over realistic MCS input

use mcs_core::{
    Document, NodeKind, OperandDef, ParameterDef, Position, SchemaCatalog, StatementDef, parse,
};

const SAMPLE: &str = "\
++HFS(BPXTEST)   DISTLIB(AHFSDLIB)
     SYSLIB(SHFSLIB)  /* target */
     TEXT  PARM(PATHMODE(0,6,4,4)).
echo hello
++JCLIN FROMDS(DSN(MY.DATA.SET) NUMBER(1))
     RELFILE(2) .
++MAC(ASMMAC) DISTLIB(AMACLIB)
  SYSLIB(SMACLIB) DELETE.
";

fn catalog() -> SchemaCatalog {
    SchemaCatalog::new()
        .with_statement(
            StatementDef::new("HFS")
                .with_parameter(ParameterDef::required().max_length(8))
                .inline_data(true)
                .operand(
                    OperandDef::new("DISTLIB")
                        .required()
                        .with_parameter(ParameterDef::required()),
                )
                .operand(
                    OperandDef::new("SYSLIB")
                        .required()
                        .with_parameter(ParameterDef::required()),
                )
                .operand(OperandDef::new("TEXT").exclusive_group("format"))
                .operand(OperandDef::new("BINARY").exclusive_group("format"))
                .operand(OperandDef::new("PARM").with_parameter(ParameterDef::required())),
        )
        .with_statement(
            StatementDef::new("JCLIN")
                .inline_data(true)
                .operand(
                    OperandDef::new("FROMDS")
                        .sub_operand(
                            OperandDef::new("DSN").with_parameter(ParameterDef::required()),
                        )
                        .sub_operand(
                            OperandDef::new("NUMBER").with_parameter(ParameterDef::required()),
                        ),
                )
                .operand(OperandDef::new("RELFILE").with_parameter(ParameterDef::required())),
        )
}

fn assert_positions_address_text(document: &Document, source: &str) {
    let mut roots: Vec<_> = document.statements().to_vec();
    roots.extend_from_slice(document.comments());

    for root in roots {
        for id in document.descendants(root) {
            let node = document.node(id);
            let addressed = node.position.slice(source);
            assert_eq!(
                addressed.as_deref(),
                Some(node.text()),
                "{:?} '{}' at {:?}",
                node.kind,
                node.text(),
                node.position
            );
        }
    }
}

#[test]
fn test_every_node_addresses_its_text() {
    let catalog = catalog();
    let document = parse(SAMPLE, &catalog);

    assert_eq!(document.statements().len(), 3);
    assert_eq!(document.comments().len(), 1);
    assert!(document.parse_errors().is_empty());
    assert_positions_address_text(&document, SAMPLE);
}

#[test]
fn test_positions_with_unknown_statements_and_errors() {
    let source = "++FOO(BAR)\n   ALPHA(1)  beta\n   GAMMA(X Y) .\n";
    let catalog = catalog();
    let document = parse(source, &catalog);

    assert_positions_address_text(&document, source);
    let error = &document.parse_errors()[0];
    assert_eq!(error.position.slice(source).as_deref(), Some("beta"));
}

#[test]
fn test_values_spanning_lines_and_holding_comments() {
    let catalog = SchemaCatalog::new().with_statement(
        StatementDef::new("MAC")
            .with_parameter(ParameterDef::required())
            .inline_data(true)
            .operand(OperandDef::new("MALIAS").with_parameter(ParameterDef::required()))
            .operand(OperandDef::new("DISTLIB").with_parameter(ParameterDef::required())),
    );
    let source = "++MAC(A) MALIAS(ONE,\n  TWO) DISTLIB(D /* lib */).\n";
    let document = parse(source, &catalog);
    assert_positions_address_text(&document, source);

    let statement = document.statements()[0];
    let values: Vec<_> = document
        .operands(statement)
        .filter_map(|(id, _)| document.parameter(id))
        .map(|(_, node)| node.value.as_str())
        .collect();
    assert_eq!(values, vec!["ONE,\n  TWO", "D /* lib */"]);

    // continuation line of the MALIAS value
    let value = document.node_at(1, 3).unwrap();
    assert_eq!(document.node(value).kind, NodeKind::Parameter);
    assert_eq!(document.node(value).value, "ONE,\n  TWO");

    // first line of the same value
    assert_eq!(document.node_at(0, 18), Some(value));
}

#[test]
fn test_inline_data_classification() {
    let catalog = catalog();
    let document = parse(SAMPLE, &catalog);
    let statements = document.statements();

    // ++HFS is followed by one payload line
    assert_eq!(document.inline_data_statements(), &[statements[0]]);
    let hfs = document.node(statements[0]).statement.as_ref().unwrap();
    assert_eq!(hfs.inline_data_lines, 1);

    // FROMDS/RELFILE point the payload elsewhere
    let jclin = document.node(statements[1]).statement.as_ref().unwrap();
    assert!(!jclin.expects_inline_data);
}

#[test]
fn test_navigation() {
    let catalog = catalog();
    let document = parse(SAMPLE, &catalog);

    let hfs = document.statements()[0];
    assert_eq!(document.statement_at_line(2), Some(hfs));
    assert_eq!(document.statement_at_line(3), None);

    // cursor inside "SHFSLIB"
    let value = document.node_at(1, 14).unwrap();
    assert_eq!(document.node(value).kind, NodeKind::Parameter);
    assert_eq!(document.node(value).value, "SHFSLIB");

    let chain: Vec<_> = document
        .ancestors(value)
        .map(|id| document.node(id).name.clone())
        .collect();
    assert_eq!(chain, vec!["SYSLIB".to_string(), "++HFS".to_string()]);

    // cursor just after "TEXT"
    let text = document.node_at(2, 9).unwrap();
    assert_eq!(document.node(text).name, "TEXT");
}

#[test]
fn test_sub_operand_positions() {
    let catalog = catalog();
    let document = parse(SAMPLE, &catalog);
    let jclin = document.statements()[1];

    let (fromds, _) = document.operands(jclin).next().unwrap();
    let (number, node) = document.operands(fromds).nth(1).unwrap();
    assert_eq!(node.name, "NUMBER");
    assert_eq!(node.position, Position::new(4, 32, 6));
    assert_eq!(document.statement_of(number), Some(jclin));
}

#[test]
fn test_parse_twice_is_identical() {
    let catalog = catalog();
    assert_eq!(parse(SAMPLE, &catalog), parse(SAMPLE, &catalog));
}

#[test]
fn test_empty_input() {
    let catalog = catalog();
    let document = parse("", &catalog);
    assert!(document.statements().is_empty());
    assert!(document.comments().is_empty());
}
