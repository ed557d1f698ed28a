//! Shell-style brace expansion for shorthand entity strings.

/// Expand `{a,b}` alternatives, left to right, including nested groups.
///
/// Groups without a top-level comma and unbalanced braces are kept literally.
pub fn expand_braces(input: &str) -> Vec<String> {
    let mut search_from = 0;

    while let Some(rel) = input[search_from..].find('{') {
        let open = search_from + rel;
        let Some((close, commas)) = match_group(input, open) else {
            break;
        };

        if commas.is_empty() {
            search_from = open + 1;
            continue;
        }

        let prefix = &input[..open];
        let suffix = &input[close + 1..];

        let mut alternatives = Vec::with_capacity(commas.len() + 1);
        let mut start = open + 1;
        for comma in commas {
            alternatives.push(&input[start..comma]);
            start = comma + 1;
        }
        alternatives.push(&input[start..close]);

        return alternatives
            .into_iter()
            .flat_map(|alt| expand_braces(&format!("{prefix}{alt}{suffix}")))
            .collect();
    }

    vec![input.to_string()]
}

/// Closing brace index and top-level comma indices of the group at `open`
fn match_group(input: &str, open: usize) -> Option<(usize, Vec<usize>)> {
    let mut depth = 0usize;
    let mut commas = Vec::new();

    for (idx, byte) in input.bytes().enumerate().skip(open) {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((idx, commas));
                }
            }
            b',' if depth == 1 => commas.push(idx),
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_braces() {
        assert_eq!(expand_braces("b1.css"), vec!["b1.css"]);
    }

    #[test]
    fn test_cartesian_product() {
        assert_eq!(
            expand_braces("{b1,b2}.{t1,t2}"),
            vec!["b1.t1", "b1.t2", "b2.t1", "b2.t2"]
        );
    }

    #[test]
    fn test_nested() {
        assert_eq!(
            expand_braces("b__{e1,e2{_m1,_m2}}"),
            vec!["b__e1", "b__e2_m1", "b__e2_m2"]
        );
    }

    #[test]
    fn test_empty_alternative() {
        assert_eq!(expand_braces("b{,_m}.css"), vec!["b.css", "b_m.css"]);
    }

    #[test]
    fn test_single_item_group_is_literal() {
        assert_eq!(expand_braces("{b}.{t1,t2}"), vec!["{b}.t1", "{b}.t2"]);
    }

    #[test]
    fn test_unbalanced_is_literal() {
        assert_eq!(expand_braces("{b1,b2"), vec!["{b1,b2"]);
        assert_eq!(expand_braces("b1}"), vec!["b1}"]);
    }

    #[test]
    fn test_path_prefix_kept() {
        assert_eq!(
            expand_braces("/p/level1/{b1,b2}"),
            vec!["/p/level1/b1", "/p/level1/b2"]
        );
    }
}
