//! Snapshot tests for the parser and generators.
//!
//! Run `cargo insta review` to update snapshots after intentional changes.

use normalize_codemodel::{
    GenerateOptions, ParseOptions, SourceFile, generator_for_language, parse_python,
};

fn parse(code: &str) -> SourceFile {
    parse_python(code, "sample", &ParseOptions::default()).expect("parse failed")
}

fn generate(lang: &str, file: &SourceFile) -> String {
    generator_for_language(lang)
        .expect("generator registered")
        .generate(file, &GenerateOptions::default())
        .expect("generate failed")
}

// ============================================================================
// Parser snapshots - verify the IR shape
// ============================================================================

mod python_reader {
    use super::*;

    #[test]
    fn augmented_assignment() {
        insta::assert_json_snapshot!(parse("total += price * qty\n").statements, @r#"
        [
          {
            "kind": {
              "assignment": {
                "target": "total",
                "operator": "+=",
                "value": "price * qty"
              }
            }
          }
        ]
        "#);
    }

    #[test]
    fn bare_return_and_raise() {
        let file = parse("def f():\n    if done:\n        return\n    raise\n");
        insta::assert_json_snapshot!(file.functions[0].body(), @r#"
        [
          {
            "kind": {
              "if": {
                "condition": "done",
                "then_branch": [
                  {
                    "kind": {
                      "return": null
                    }
                  }
                ]
              }
            }
          },
          {
            "kind": {
              "throw": null
            }
          }
        ]
        "#);
    }
}

// ============================================================================
// Writer snapshots - verify emitted text
// ============================================================================

mod python_writer {
    use super::*;

    #[test]
    fn normalizes_layout() {
        let file = parse(
            "import os\nclass Config:\n    '''Settings.'''\n    debug = False\n    def load(self, path):\n        with open(path) as f:\n            return f.read()\nprint(Config().load('x'))\n",
        );
        insta::assert_snapshot!(generate("python", &file), @r#"
        import os


        class Config:
            """Settings."""

            debug = False

            def load(self, path):
                with open(path) as f:
                    return f.read()


        print(Config().load('x'))
        "#);
    }

    #[test]
    fn properties_and_indexers() {
        let file = parse(concat!(
            "class Grid:\n",
            "    @property\n",
            "    def size(self) -> int:\n",
            "        return len(self.cells)\n",
            "\n",
            "    def __getitem__(self, i: int) -> str:\n",
            "        return self.cells[i]\n",
            "\n",
            "    def __setitem__(self, i: int, value: str) -> None:\n",
            "        self.cells[i] = value\n",
        ));
        insta::assert_snapshot!(generate("python", &file), @r#"
        class Grid:
            @property
            def size(self) -> int:
                return len(self.cells)

            def __getitem__(self, i: int) -> str:
                return self.cells[i]

            def __setitem__(self, i: int, value: str) -> None:
                self.cells[i] = value
        "#);
    }
}

mod csharp_writer {
    use super::*;

    #[test]
    fn greeter_translation() {
        let file = parse(
            "class Greeter:\n    def __init__(self, name):\n        self.name = name\n    def greet(self):\n        return self.name\n",
        );
        insta::assert_snapshot!(generate("csharp", &file), @r"
        public class Greeter
        {
            public Greeter(object name)
            {
                self.name = name;
            }

            public void Greet()
            {
                return self.name;
            }
        }
        ");
    }

    #[test]
    fn typed_module_translation() {
        let file = parse(concat!(
            "from typing import List\n",
            "\n",
            "\n",
            "def total(values: List[float]) -> float:\n",
            "    result = 0.0\n",
            "    for v in values:\n",
            "        result += v\n",
            "    return result\n",
        ));
        insta::assert_snapshot!(generate("csharp", &file), @r"
        public static class SampleModule
        {
            public static double Total(List<double> values)
            {
                result = 0.0;
                foreach (var v in values)
                {
                    result += v;
                }
                return result;
            }
        }
        ");
    }
}
