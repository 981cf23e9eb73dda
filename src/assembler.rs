//! Assembly from parsed mnemonic statements to a numeric program.
//!
//! Assembly runs three passes over the statements before emitting code:
//!
//! 1. counting instructions, which may not exceed [MAX_INSTRUCTIONS],
//! 2. resolving every label to the address of the instruction following it,
//! 3. allocating a memory cell for every variable on its first `STORE`.
//!
//! Each pass is a fold over the statement list and reports its own diagnostics.
//! A program is only produced if none of the passes reported anything.

use slog::{debug, o, trace, Discard, Logger};

use crate::bytecode::Program;
use crate::emulator::MEMORY_SIZE;
use crate::error::{Diagnostic, ErrorKind};
use crate::instruction::{Address, UnaryOp, Word};
use crate::parsing::SourceSpan;
use crate::source_map::SourceMap;
use crate::symbol_table::{next_variable_slot, SymbolTable, FIRST_VARIABLE_SLOT};
use crate::symbolic::{Statement, UnaryInstruction};

/// Largest number of instructions a program may have.
pub const MAX_INSTRUCTIONS: usize = 90;

/// The artifacts of a successful assembly.
#[derive(Debug, Clone)]
pub struct Assembly {
    /// The numeric program.
    pub program: Program,

    /// Addresses of all labels and variables.
    pub symbols: SymbolTable,

    /// The statement each memory word was generated from.
    pub source_map: SourceMap<SourceSpan>,
}

/// Counts the instructions in `statements`.
///
/// The first instruction past [MAX_INSTRUCTIONS] is reported, further ones are not.
pub fn count_instructions(statements: &[Statement]) -> (usize, Option<Diagnostic>) {
    statements
        .iter()
        .filter(|statement| statement.is_instruction())
        .fold((0, None), |(count, overflow), statement| {
            let count = count + 1;

            let overflow = overflow.or_else(|| {
                if count > MAX_INSTRUCTIONS {
                    Some(Diagnostic::new(statement.span(), ErrorKind::TooManyInstructions))
                } else {
                    None
                }
            });

            (count, overflow)
        })
}

/// Records the address of every label in `table`.
pub fn resolve_labels(statements: &[Statement], table: SymbolTable) -> (SymbolTable, Vec<Diagnostic>) {
    let (table, _, diagnostics) = statements.iter().fold(
        (table, 0, Vec::new()),
        |(mut table, address, mut diagnostics), statement| match statement {
            Statement::Label(label) => {
                if !table.define_label(&label.name, address) {
                    diagnostics.push(Diagnostic::new(label.span, ErrorKind::DuplicateLabel));
                }

                (table, address, diagnostics)
            }
            _ => (table, address + 1, diagnostics),
        },
    );

    (table, diagnostics)
}

/// Gives every stored variable a memory cell, in order of first appearance.
///
/// At most `MEMORY_SIZE - instruction_count` variables are allowed; the first one
/// past the limit is reported.
pub fn allocate_variables(
    statements: &[Statement],
    instruction_count: usize,
    table: SymbolTable,
) -> (SymbolTable, Option<Diagnostic>) {
    let max_variables = MEMORY_SIZE.saturating_sub(instruction_count);

    let (table, _, _, overflow) = statements.iter().fold(
        (table, FIRST_VARIABLE_SLOT, 0, None),
        |(mut table, slot, allocated, overflow): (SymbolTable, Address, usize, Option<Diagnostic>), statement| {
            let arg = match statement {
                Statement::Unary(UnaryInstruction {
                    op: UnaryOp::Store,
                    arg: Some(arg),
                    ..
                }) if table.variable(&arg.name).is_none() => arg,
                _ => return (table, slot, allocated, overflow),
            };

            let allocated = allocated + 1;

            let overflow = overflow.or_else(|| {
                if allocated > max_variables {
                    Some(Diagnostic::new(arg.span, ErrorKind::TooManyVariables))
                } else {
                    None
                }
            });

            table.define_variable(&arg.name, slot);

            (table, next_variable_slot(slot), allocated, overflow)
        },
    );

    (table, overflow)
}

/// Emits the code of every instruction whose operand could be resolved.
///
/// Instructions whose operand failed to parse emit nothing; their error was
/// already reported by the parser.
fn generate(
    statements: &[Statement],
    table: &SymbolTable,
    logger: &Logger,
) -> (Vec<Word>, SourceMap<SourceSpan>, Vec<Diagnostic>) {
    let mut words = Vec::new();
    let mut source_map = SourceMap::default();
    let mut diagnostics = Vec::new();

    for statement in statements {
        let word = match statement {
            Statement::Label(_) => continue,
            Statement::Nullary(ins) => ins.op.code(),
            Statement::Unary(UnaryInstruction { arg: None, .. }) => continue,
            Statement::Unary(UnaryInstruction {
                op, arg: Some(arg), ..
            }) => match table.get(&arg.name, op.operand_kind()) {
                Some(address) if address < MEMORY_SIZE => op.encode(address),
                // Labels past the end of memory only exist in programs with
                // too many instructions, which was already reported.
                Some(_) => continue,
                None => {
                    let kind = ErrorKind::NoSuchSymbol {
                        kind: op.operand_kind(),
                    };
                    diagnostics.push(Diagnostic::new(arg.span, kind));
                    continue;
                }
            },
        };

        trace!(logger, "emit word"; "address" => words.len(), "word" => word);

        source_map.insert(words.len(), statement.span());
        words.push(word);
    }

    (words, source_map, diagnostics)
}

/// Assembles `statements` into a numeric program.
pub fn assemble(statements: &[Statement]) -> Result<Vec<Word>, Vec<Diagnostic>> {
    assemble_program(statements).map(|assembly| assembly.program.words)
}

/// Assembles `statements`, keeping the symbol table and the source map.
pub fn assemble_program(statements: &[Statement]) -> Result<Assembly, Vec<Diagnostic>> {
    assemble_with_logger(statements, None)
}

pub fn assemble_with_logger<L>(statements: &[Statement], logger: L) -> Result<Assembly, Vec<Diagnostic>>
where
    L: Into<Option<Logger>>,
{
    let logger = logger
        .into()
        .unwrap_or(Logger::root(Discard, o!()))
        .new(o!("stage" => "assembly"));

    let mut diagnostics = Vec::new();

    let (instruction_count, overflow) = count_instructions(statements);
    trace!(logger, "counted instructions"; "count" => instruction_count);
    diagnostics.extend(overflow);

    let (table, label_errors) = resolve_labels(statements, SymbolTable::new());
    trace!(logger, "resolved labels"; "labels" => ?table.labels());
    diagnostics.extend(label_errors);

    let (table, overflow) = allocate_variables(statements, instruction_count, table);
    trace!(logger, "allocated variables"; "variables" => ?table.variables());
    diagnostics.extend(overflow);

    let (words, source_map, unresolved) = generate(statements, &table, &logger);
    diagnostics.extend(unresolved);

    if !diagnostics.is_empty() {
        debug!(logger, "assembly failed"; "errors" => diagnostics.len());
        return Err(diagnostics);
    }

    debug!(logger, "assembly finished"; "words" => words.len());

    Ok(Assembly {
        program: Program { words },
        symbols: table,
        source_map,
    })
}

#[cfg(test)]
fn assemble_source(source: &str) -> Result<Vec<Word>, Vec<Diagnostic>> {
    let (statements, diagnostics) = crate::symbolic::parse_statements(source);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    assemble(&statements)
}

#[cfg(test)]
fn messages(diagnostics: &[Diagnostic]) -> Vec<String> {
    diagnostics.iter().map(Diagnostic::message).collect()
}

#[test]
fn test_assemble_variables() {
    assert_eq!(assemble_source("store x\nadd x"), Ok(vec![490, 190]));
    assert_eq!(assemble_source("load zero\nsub ONE"), Ok(vec![398, 299]));
    assert_eq!(
        assemble_source("read\nstore a\nstore b\nload a\nstore A\nwrite\nstop"),
        Ok(vec![800, 490, 491, 390, 490, 900, 0]),
    );
}

#[test]
fn test_assemble_labels() {
    assert_eq!(assemble_source("foo:\ngoto foo"), Ok(vec![500]));
    assert_eq!(
        assemble_source("gotoz end\ngotop End\nread\nend:\nstop"),
        Ok(vec![603, 703, 800, 0]),
    );
    assert_eq!(
        assemble_source("a:\nb:\nread\nc:\ngoto a\ngoto b\ngoto c"),
        Ok(vec![800, 500, 500, 501]),
    );
}

#[test]
fn test_variables_resolve_before_first_store() {
    assert_eq!(assemble_source("load x\nstore x"), Ok(vec![390, 490]));
}

#[test]
fn test_undefined_symbols() {
    let errors = assemble_source("goto nowhere\nload nothing\nloop:\nload loop")
        .unwrap_err();

    assert_eq!(
        messages(&errors),
        vec!["No such label", "No such variable", "No such variable"]
    );
    assert_eq!(errors[0].span, SourceSpan::new(0, 5, 12));
    assert_eq!(errors[1].span, SourceSpan::new(1, 5, 12));
}

#[test]
fn test_duplicate_label() {
    let errors = assemble_source("x:\nread\nX:\ngoto x").unwrap_err();

    assert_eq!(messages(&errors), vec!["Duplicate label"]);
    assert_eq!(errors[0].span, SourceSpan::new(2, 0, 1));
}

#[test]
fn test_too_many_instructions() {
    let source = std::iter::repeat("add one").take(95).collect::<Vec<_>>().join("\n");
    let errors = assemble_source(&source).unwrap_err();

    assert_eq!(messages(&errors), vec!["Too many instructions"]);
    assert_eq!(errors[0].span, SourceSpan::new(90, 0, 7));

    let source = std::iter::repeat("add one").take(90).collect::<Vec<_>>().join("\n");
    assert_eq!(assemble_source(&source).map(|w| w.len()), Ok(90));
}

#[test]
fn test_too_many_variables() {
    // 85 instructions leave room for 15 variables.
    let mut lines: Vec<String> = (0..16).map(|i| format!("store v{}", i)).collect();
    lines.extend(std::iter::repeat("write".to_string()).take(69));

    let errors = assemble_source(&lines.join("\n")).unwrap_err();

    assert_eq!(messages(&errors), vec!["Too many variables"]);
    assert_eq!(errors[0].span, SourceSpan::new(15, 6, 9));

    lines.pop();
    assert!(assemble_source(&lines.join("\n")).is_ok());
}

#[test]
fn test_too_many_variables_reported_once() {
    // 85 instructions, 18 of them stores of new variables: three too many.
    let mut lines: Vec<String> = (0..18).map(|i| format!("store v{}", i)).collect();
    lines.extend(std::iter::repeat("write".to_string()).take(67));
    let source = lines.join("\n");

    let errors = assemble_source(&source).unwrap_err();

    assert_eq!(messages(&errors), vec!["Too many variables"]);
    assert_eq!(errors[0].span, SourceSpan::new(15, 6, 9));

    let (statements, _) = crate::symbolic::parse_statements(&source);
    let (count, _) = count_instructions(&statements);
    let (table, overflow) = allocate_variables(&statements, count, SymbolTable::new());

    assert_eq!(count, 85);
    assert_eq!(overflow.map(|d| d.span), Some(SourceSpan::new(15, 6, 9)));
    assert_eq!(table.variable("v14"), Some(83));
    assert_eq!(table.variable("v15"), Some(82));
    assert_eq!(table.variable("v16"), Some(81));
    assert_eq!(table.variable("v17"), Some(80));
}

#[test]
fn test_exhausted_variable_slots_stay_at_zero() {
    let lines: Vec<String> = (0..100).map(|i| format!("store v{}", i)).collect();
    let source = lines.join("\n");

    let errors = assemble_source(&source).unwrap_err();

    assert_eq!(messages(&errors), vec!["Too many instructions", "Too many variables"]);
    assert_eq!(errors[1].span, SourceSpan::new(0, 6, 8));

    let (statements, _) = crate::symbolic::parse_statements(&source);
    let (table, _) = allocate_variables(&statements, 100, SymbolTable::new());

    assert_eq!(table.variable("v97"), Some(0));
    assert_eq!(table.variable("v98"), Some(0));
    assert_eq!(table.variable("v99"), Some(0));
}

#[test]
fn test_labels_past_memory_do_not_overflow() {
    let mut lines = vec!["read"; 32100];
    lines.push("x:");
    lines.push("gotop x");

    let errors = assemble_source(&lines.join("\n")).unwrap_err();

    assert_eq!(messages(&errors), vec!["Too many instructions"]);
    assert_eq!(errors[0].span, SourceSpan::new(90, 0, 4));
}

#[test]
fn test_failed_argument_emits_nothing() {
    let (statements, diagnostics) = crate::symbolic::parse_statements("read\nload 12\nwrite");

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(assemble(&statements), Ok(vec![800, 900]));
}

#[test]
fn test_assemble_source_map() {
    let (statements, _) = crate::symbolic::parse_statements("start:\n  read\n\n  store n // keep\n  stop");
    let assembly = assemble_program(&statements).unwrap();

    assert_eq!(assembly.program.words, vec![800, 490, 0]);
    assert_eq!(assembly.source_map.get_source_span(0), Some(&SourceSpan::new(1, 2, 6)));
    assert_eq!(assembly.source_map.get_source_span(1), Some(&SourceSpan::new(3, 2, 9)));
    assert_eq!(assembly.source_map.get_source_span(2), Some(&SourceSpan::new(4, 2, 6)));
    assert_eq!(assembly.symbols.label("start"), Some(0));
    assert_eq!(assembly.symbols.variable("n"), Some(90));
}
