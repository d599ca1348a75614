// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Thin adapter over `oxc_parser`. Owns the one policy decision this
//! crate makes about dialect (always parse as module source, so both
//! `import`/`export` and bare `require(...)` calls are legal syntax)
//! and the shebang-tolerance rule.

use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_parser::Parser;
use oxc_span::SourceType;

/// Strip a leading `#!...` line, if present, so the parser never sees
/// it. Node tolerates a shebang as the first line of any entry script;
/// `oxc_parser` does too, but stripping it here keeps that tolerance
/// explicit and independent of the parser's own behavior.
pub fn strip_shebang(source: &str) -> &str {
    match source.strip_prefix("#!") {
        Some(rest) => match rest.find('\n') {
            Some(idx) => &rest[idx + 1..],
            None => "",
        },
        None => source,
    }
}

/// Parse `source` (already shebang-stripped) into a rooted AST borrowed
/// from `allocator`. Returns `None` on any parse error; the caller is
/// expected to log the failure with the originating file path and move
/// on to the next file.
pub fn parse<'a>(allocator: &'a Allocator, source: &'a str) -> Option<Program<'a>> {
    let source_type = SourceType::mjs();
    let result = Parser::new(allocator, source, source_type).parse();
    if result.panicked || !result.errors.is_empty() {
        return None;
    }
    Some(result.program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_shebang_line() {
        assert_eq!(strip_shebang("#!/usr/bin/env node\nconsole.log(1)"), "console.log(1)");
        assert_eq!(strip_shebang("no shebang here"), "no shebang here");
        assert_eq!(strip_shebang("#!only a shebang, no newline"), "");
    }

    #[test]
    fn parses_mixed_import_and_require() {
        let allocator = Allocator::default();
        let source = "import fs from 'fs'; const path = require('path');";
        let program = parse(&allocator, source).expect("should parse");
        assert!(!program.body.is_empty());
    }

    #[test]
    fn parse_failure_returns_none() {
        let allocator = Allocator::default();
        let program = parse(&allocator, "const = ;;;");
        assert!(program.is_none());
    }
}
