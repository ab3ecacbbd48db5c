/// Extracts `(height, width)` in centimetres from a museum dimension string.
///
/// Handles both orderings seen in the wild, e.g.
/// `"73.7 × 92.1 cm (29 × 36 1/4 in.)"` and `"29 x 36 in. (73.7 x 91.4 cm)"`.
/// The first metric measurement wins; inch-only strings yield `None`.
pub fn parse_dimensions(text: &str) -> Option<(f64, f64)> {
    let lowered = text.to_lowercase();

    for segment in lowered.split(|c| matches!(c, '(' | ')' | ';' | '\n')) {
        let Some(end) = find_cm(segment) else {
            continue;
        };
        let numbers = numbers_in(&segment[..end]);
        if numbers.len() >= 2 {
            return Some((numbers[0], numbers[1]));
        }
    }
    None
}

fn find_cm(segment: &str) -> Option<usize> {
    segment.match_indices("cm").map(|(i, _)| i).find(|&i| {
        // "cm" must end the word: not "cmyk" or the like.
        !segment[i + 2..]
            .chars()
            .next()
            .map(char::is_alphabetic)
            .unwrap_or(false)
    })
}

fn numbers_in(text: &str) -> Vec<f64> {
    text.replace('×', " x ")
        .split(|c: char| c.is_whitespace() || c == 'x')
        .map(|token| token.trim_matches(|c: char| !c.is_ascii_digit() && c != '.'))
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.parse::<f64>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_first() {
        assert_eq!(
            parse_dimensions("73.7 × 92.1 cm (29 × 36 1/4 in.)"),
            Some((73.7, 92.1))
        );
    }

    #[test]
    fn test_imperial_first() {
        assert_eq!(
            parse_dimensions("29 x 36 in. (73.7 x 91.4 cm)"),
            Some((73.7, 91.4))
        );
    }

    #[test]
    fn test_labelled_parts() {
        assert_eq!(
            parse_dimensions("Image: 59.7 × 73 cm (23 1/2 × 28 3/4 in.); Frame: 80 × 95 cm"),
            Some((59.7, 73.0))
        );
        assert_eq!(parse_dimensions("Box: 10x12cm"), Some((10.0, 12.0)));
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse_dimensions("29 × 36 in."), None);
        assert_eq!(parse_dimensions("Diam. 12 cm"), None);
        assert_eq!(parse_dimensions(""), None);
    }
}
