//! Lossless round trip over representative inputs

use refit_core::syntax::parse;

fn assert_round_trip(source: &str) {
    let tree = parse(source).unwrap_or_else(|e| panic!("failed to parse {source:?}: {e}"));
    assert_eq!(tree.text(), source, "Lossless property failed");
    assert_eq!(tree.root().text(), source);
}

#[test]
fn test_empty_and_trivia_only() {
    assert_round_trip("");
    assert_round_trip("   \n\t");
    assert_round_trip("// only a comment\n");
    assert_round_trip("/* block */");
}

#[test]
fn test_crlf_and_directives() {
    assert_round_trip("#region Fields\r\nclass C\r\n{\r\n    int a;\r\n}\r\n#endregion\r\n");
}

#[test]
fn test_members() {
    assert_round_trip(
        r#"using System;
using System.Collections.Generic;

namespace Demo.Inner
{
    [Flags]
    public enum Options : byte
    {
        None = 0,
        A = 1 << 0,
        B = 1 << 1, // trailing
        AB = A | B,
    }

    internal sealed class Widget : IDisposable
    {
        private const int Max = 10;
        private readonly List<string> _names = new List<string>();

        public Widget(int size) { Size = size; }

        public int Size { get; private set; }

        public string this_is_not_an_indexer;

        public void Dispose() { }
    }
}
"#,
    );
}

#[test]
fn test_statements_and_expressions() {
    assert_round_trip(
        r#"class C
{
    int M(int[] items, string s)
    {
        var count = items.Length;
        if (count > 0 && s != null)
        {
            return items[0] + (int)s.Length * 2;
        }
        else if (s is string)
            count <<= 1;
        else
        {
            throw new InvalidOperationException("none");
        }

        while (count-- > 0) { }

        switch (count)
        {
            case 1:
            case 2:
                break;
            default:
                return -count;
        }

        return count >= 0 ? count : ~count ?? 0;
    }
}
"#,
    );
}

#[test]
fn test_parse_error_reports_offset() {
    let err = parse("class C { void M() { x = ; } }").unwrap_err();
    assert!(matches!(err, refit_core::RefitError::Parse { .. }));
}
