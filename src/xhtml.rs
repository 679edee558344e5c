//! String-level rewrite of rendered markup into strict XHTML.
//!
//! The rewrite is one ordered table of `(stage, pattern, rewrite)` rules.
//! [`canonicalize`] applies the whole table repeatedly until the text stops
//! changing, so the result is a fixed point of the table:
//! `canonicalize(canonicalize(x)) == canonicalize(x)`.

use std::sync::LazyLock;

use regex_lite::{Captures, Regex};
use tracing::debug;

/// Rule groups, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// XML declaration and doctype layout.
    Declaration,
    /// Void elements in self-closed form.
    VoidElements,
    /// Named entities expanded to characters.
    Entities,
    /// Whitespace around `span`, `sup` and `a` boundaries.
    InlineWhitespace,
}

enum Rewrite {
    Template(&'static str),
    Expand(fn(&Captures) -> String),
}

struct Rule {
    stage: Stage,
    pattern: &'static str,
    rewrite: Rewrite,
}

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

const RULES: &[Rule] = &[
    // html5ever keeps `<?xml ...?>` as a bogus comment.
    Rule {
        stage: Stage::Declaration,
        pattern: r"\A\s*<!--\?xml(.*?)\?-->\s*",
        rewrite: Rewrite::Template("<?xml${1}?>\n"),
    },
    Rule {
        stage: Stage::Declaration,
        pattern: r"\A(<!DOCTYPE|<html)",
        rewrite: Rewrite::Expand(prepend_declaration),
    },
    Rule {
        stage: Stage::Declaration,
        pattern: r"(<!DOCTYPE [^>]*>)<",
        rewrite: Rewrite::Template("${1}\n<"),
    },
    Rule {
        stage: Stage::VoidElements,
        pattern: r"<(meta|hr|img|br|link|col|wbr|input|area|base|source|track|embed)\b([^>]*?)[ \t\r\n]*/?[ \t\r\n]*>",
        rewrite: Rewrite::Template("<${1}${2}/>"),
    },
    Rule {
        stage: Stage::Entities,
        pattern: r"&([A-Za-z][A-Za-z0-9]*);",
        rewrite: Rewrite::Expand(expand_entity),
    },
    Rule {
        stage: Stage::InlineWhitespace,
        pattern: r"([^-/])>([ \t\r\n]*)\n([ \t]*)<(span|sup|a)([ \t\r\n>/])",
        rewrite: Rewrite::Template("${1}\n${3}><${4}${5}"),
    },
    Rule {
        stage: Stage::InlineWhitespace,
        pattern: r"</(span|sup|a)>([ \t\r\n]*)\n([ \t]*)<",
        rewrite: Rewrite::Template("</${1}\n${3}><"),
    },
    Rule {
        stage: Stage::InlineWhitespace,
        pattern: r"([^-/])>[ \t\r\n]+<(span|sup|a)([ \t\r\n>/])",
        rewrite: Rewrite::Template("${1}><${2}${3}"),
    },
    // A self-closed tag cannot take the newline inside it.
    Rule {
        stage: Stage::InlineWhitespace,
        pattern: r"/>[ \t\r\n]+<(span|sup|a)([ \t\r\n>/])",
        rewrite: Rewrite::Template("/><${1}${2}"),
    },
    Rule {
        stage: Stage::InlineWhitespace,
        pattern: r"</(span|sup|a)>[ \t\r\n]+<",
        rewrite: Rewrite::Template("</${1}><"),
    },
];

static COMPILED: LazyLock<Vec<(&'static Rule, Regex)>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|rule| {
            let regex = Regex::new(rule.pattern).expect("canonicalization pattern is valid");
            (rule, regex)
        })
        .collect()
});

/// Upper bound on whole-table passes.
const MAX_PASSES: usize = 32;

/// Entities that stay escaped because XML itself needs them.
const XML_ENTITIES: &[&str] = &["amp", "lt", "gt", "quot", "apos"];

/// Named entities expanded to literal characters.
const NAMED_ENTITIES: &[(&str, char)] = &[
    ("nbsp", '\u{00A0}'),
    ("shy", '\u{00AD}'),
    ("iexcl", '¡'),
    ("cent", '¢'),
    ("pound", '£'),
    ("euro", '€'),
    ("yen", '¥'),
    ("sect", '§'),
    ("copy", '©'),
    ("reg", '®'),
    ("trade", '™'),
    ("deg", '°'),
    ("plusmn", '±'),
    ("para", '¶'),
    ("middot", '·'),
    ("laquo", '«'),
    ("raquo", '»'),
    ("iquest", '¿'),
    ("times", '×'),
    ("divide", '÷'),
    ("ndash", '–'),
    ("mdash", '—'),
    ("lsquo", '‘'),
    ("rsquo", '’'),
    ("sbquo", '‚'),
    ("ldquo", '“'),
    ("rdquo", '”'),
    ("bdquo", '„'),
    ("hellip", '…'),
    ("bull", '•'),
    ("prime", '′'),
    ("Agrave", 'À'),
    ("Aacute", 'Á'),
    ("Acirc", 'Â'),
    ("Auml", 'Ä'),
    ("Ccedil", 'Ç'),
    ("Egrave", 'È'),
    ("Eacute", 'É'),
    ("Ecirc", 'Ê'),
    ("Iacute", 'Í'),
    ("Ntilde", 'Ñ'),
    ("Oacute", 'Ó'),
    ("Ouml", 'Ö'),
    ("Uacute", 'Ú'),
    ("Uuml", 'Ü'),
    ("szlig", 'ß'),
    ("agrave", 'à'),
    ("aacute", 'á'),
    ("acirc", 'â'),
    ("auml", 'ä'),
    ("ccedil", 'ç'),
    ("egrave", 'è'),
    ("eacute", 'é'),
    ("ecirc", 'ê'),
    ("euml", 'ë'),
    ("igrave", 'ì'),
    ("iacute", 'í'),
    ("icirc", 'î'),
    ("iuml", 'ï'),
    ("ntilde", 'ñ'),
    ("ograve", 'ò'),
    ("oacute", 'ó'),
    ("ocirc", 'ô'),
    ("ouml", 'ö'),
    ("ugrave", 'ù'),
    ("uacute", 'ú'),
    ("ucirc", 'û'),
    ("uuml", 'ü'),
    ("yacute", 'ý'),
    ("yuml", 'ÿ'),
];

fn prepend_declaration(caps: &Captures) -> String {
    format!("{XML_DECLARATION}\n{}", &caps[1])
}

fn expand_entity(caps: &Captures) -> String {
    let name = &caps[1];
    if XML_ENTITIES.contains(&name) {
        return caps[0].to_string();
    }
    match NAMED_ENTITIES.iter().find(|(n, _)| *n == name) {
        Some((_, c)) => c.to_string(),
        None => caps[0].to_string(),
    }
}

fn apply(rule: &Rule, regex: &Regex, input: &str) -> String {
    match &rule.rewrite {
        Rewrite::Template(template) => regex.replace_all(input, *template).into_owned(),
        Rewrite::Expand(f) => regex.replace_all(input, |caps: &Captures| f(caps)).into_owned(),
    }
}

/// Apply the rules of one stage once, in table order.
pub fn apply_stage(stage: Stage, input: &str) -> String {
    let mut output = input.to_string();
    for (rule, regex) in COMPILED.iter().filter(|(rule, _)| rule.stage == stage) {
        output = apply(rule, regex, &output);
    }
    output
}

/// Rewrite rendered markup into canonical XHTML.
pub fn canonicalize(markup: &str) -> String {
    let mut output = markup.to_string();
    for pass in 1..=MAX_PASSES {
        let mut next = output.clone();
        for (rule, regex) in COMPILED.iter() {
            next = apply(rule, regex, &next);
        }
        if next == output {
            debug!(passes = pass, "canonicalized markup");
            break;
        }
        output = next;
    }
    output
}
