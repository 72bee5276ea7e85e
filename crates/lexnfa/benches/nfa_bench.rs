use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use lexnfa::LexerData;
use lexnfa::regexp::{CharacterList, Pattern, RegularExpression, TokenKind, TokenProduction};
use lexnfa::scan::tokenize;
use std::hint::black_box;

const KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface",
    "long", "native", "new", "package", "private", "protected", "public", "return", "short",
    "static", "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try",
    "void", "volatile", "while",
];

fn build_lexer(keywords: &[&str]) -> LexerData {
    let mut lexer = LexerData::default();
    let blank = lexer.add_regular_expression(RegularExpression::new(Pattern::one_or_more(
        Pattern::class(
            CharacterList::chars(' ', ' ')
                .with('\t', '\t')
                .with('\n', '\n'),
        ),
    )));
    lexer
        .add_token_production(TokenProduction::new(TokenKind::Skip).regexp(blank))
        .unwrap();

    let mut production = TokenProduction::new(TokenKind::Token);
    for keyword in keywords {
        let token = lexer.add_regular_expression(RegularExpression::literal(keyword));
        production = production.regexp(token);
    }
    let ident = lexer.add_regular_expression(RegularExpression::new(Pattern::Sequence(vec![
        Pattern::class(CharacterList::chars('a', 'z').with('A', 'Z').with('_', '_')),
        Pattern::zero_or_more(Pattern::class(
            CharacterList::chars('a', 'z')
                .with('A', 'Z')
                .with('0', '9')
                .with('_', '_'),
        )),
    ])));
    let number = lexer.add_regular_expression(RegularExpression::new(Pattern::one_or_more(
        Pattern::class(CharacterList::chars('0', '9')),
    )));
    for symbol in ["(", ")", "{", "}", ";", "=", "==", "+", "+=", "++"] {
        let token = lexer.add_regular_expression(RegularExpression::literal(symbol));
        production = production.regexp(token);
    }
    lexer
        .add_token_production(production.regexp(ident).regexp(number))
        .unwrap();
    lexer.build_data().unwrap();
    lexer
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_data");
    for count in [8, 24, KEYWORDS.len()] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| build_lexer(black_box(&KEYWORDS[..count])));
        });
    }
    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let lexer = build_lexer(KEYWORDS);
    let line =
        "public static void main ( ) { int count = 0 ; while ( count == 10 ) { count += 1 ; } }\n";
    let input = line.repeat(64);

    c.bench_function("tokenize", |b| {
        b.iter(|| tokenize(black_box(&lexer), black_box(&input)).unwrap());
    });
}

criterion_group!(benches, bench_build, bench_scan);
criterion_main!(benches);
