//! Text post-processing for LLM output.
//!
//! Models frequently indent markdown code fences to match surrounding
//! prose, which breaks rendering, and wrap commit messages in fences
//! even when told not to. Both fixes are applied to the full accumulated
//! buffer, so streamed output looks the same no matter how the chunks
//! were split.

/// Removes leading whitespace from code-fence markers and, inside
/// fences, from diff `+`/`-` markers. Everything else inside a fence is
/// preserved verbatim, including the indentation after a diff marker.
pub fn normalize_code_fences(content: &str) -> String {
    let mut in_code_block = false;

    let lines: Vec<&str> = content
        .split('\n')
        .map(|line| {
            let trimmed = line.trim_start_matches(' ');

            if trimmed.starts_with("```") {
                in_code_block = !in_code_block;
                return trimmed;
            }

            if in_code_block && (trimmed.starts_with('+') || trimmed.starts_with('-')) {
                return trimmed;
            }

            line
        })
        .collect();

    lines.join("\n")
}

/// Strips markdown code fences from a complete response, keeping the
/// fence body. Used on generated commit messages before they are loaded
/// into the editable buffer.
pub fn strip_code_fences(message: &str) -> String {
    if message.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(message.len());
    let mut rest = message;

    while let Some(start) = rest.find("```") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 3..];

        // Skip the language tag and one optional newline.
        let mut body_start = 0;
        let bytes = after.as_bytes();
        while body_start < bytes.len() && bytes[body_start].is_ascii_lowercase() {
            body_start += 1;
        }
        if body_start < bytes.len() && bytes[body_start] == b'\n' {
            body_start += 1;
        }

        let body = &after[body_start..];
        match body.find("```") {
            Some(end) => {
                out.push_str(&body[..end]);
                rest = &body[end + 3..];
            }
            None => {
                // Unmatched fence — keep the remainder untouched.
                out.push_str(&rest[start..]);
                rest = "";
                break;
            }
        }
    }

    out.push_str(rest);
    out.trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fence_markers_lose_leading_whitespace() {
        let input = "Some text\n    ```go\n    fmt.Println(\"hello\")\n    ```";
        let expected = "Some text\n```go\n    fmt.Println(\"hello\")\n```";
        assert_eq!(normalize_code_fences(input), expected);
    }

    #[test]
    fn diff_markers_inside_fences_lose_leading_whitespace() {
        let input = "```diff\n    +func main() {\n    -func old() {\n```";
        let expected = "```diff\n+func main() {\n-func old() {\n```";
        assert_eq!(normalize_code_fences(input), expected);
    }

    #[test]
    fn indentation_after_diff_marker_is_preserved() {
        let input = "```diff\n    +    if condition:\n    +        body()\n    -    if old:\n```";
        let expected = "```diff\n+    if condition:\n+        body()\n-    if old:\n```";
        assert_eq!(normalize_code_fences(input), expected);
    }

    #[test]
    fn tabs_after_diff_marker_are_preserved() {
        let input = "```diff\n    +\tfunc() {\n    +\t\treturn\n```";
        let expected = "```diff\n+\tfunc() {\n+\t\treturn\n```";
        assert_eq!(normalize_code_fences(input), expected);
    }

    #[test]
    fn non_diff_lines_inside_fences_are_untouched() {
        let input = "```go\n    func hello():\n        print(\"world\")\n```";
        assert_eq!(normalize_code_fences(input), input);
    }

    #[test]
    fn diff_markers_outside_fences_are_untouched() {
        let input = "  + this is a list-like line\nplain text";
        assert_eq!(normalize_code_fences(input), input);
    }

    #[test]
    fn multiple_fenced_blocks() {
        let input = "First:\n    ```js\n    x()\n    ```\nSecond:\n    ```py\n    y()\n    ```";
        let expected = "First:\n```js\n    x()\n```\nSecond:\n```py\n    y()\n```";
        assert_eq!(normalize_code_fences(input), expected);
    }

    #[test]
    fn empty_and_plain_content_pass_through() {
        assert_eq!(normalize_code_fences(""), "");
        let plain = "Just some text\nwith lines\nand no fences";
        assert_eq!(normalize_code_fences(plain), plain);
    }

    #[test]
    fn normalization_is_independent_of_chunk_boundaries() {
        let total = "Review:\n    ```diff\n    +added line\n    -removed line\n    ```\ndone";

        // Simulate streaming with different chunk splits; normalization
        // always runs over the whole accumulated buffer.
        for size in [1, 2, 3, 7, total.len()] {
            let mut buffer = String::new();
            let chars: Vec<char> = total.chars().collect();
            for chunk in chars.chunks(size) {
                buffer.extend(chunk);
            }
            assert_eq!(
                normalize_code_fences(&buffer),
                normalize_code_fences(total),
                "chunk size {size} changed the result"
            );
        }
    }

    #[test]
    fn strip_removes_fences_and_keeps_body() {
        assert_eq!(strip_code_fences("```\nfeat: add x\n```"), "feat: add x");
        assert_eq!(strip_code_fences("```text\nfeat: add x\n```"), "feat: add x");
    }

    #[test]
    fn strip_keeps_surrounding_text() {
        assert_eq!(
            strip_code_fences("before\n```\nbody\n```\nafter"),
            "before\nbody\n\nafter"
        );
    }

    #[test]
    fn strip_handles_empty_and_unfenced_input() {
        assert_eq!(strip_code_fences(""), "");
        assert_eq!(strip_code_fences("fix: plain message"), "fix: plain message");
    }

    #[test]
    fn strip_leaves_unmatched_fence_alone() {
        assert_eq!(strip_code_fences("text ``` rest"), "text ``` rest");
    }
}
