/// How enumerated sense markers inside a definition are broken onto their own
/// indented lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumberingStyle {
    /// ` N.` becomes `\n\tN.`.
    Dots,
    /// Like `Dots`, and a marker at the very start of the line is broken too.
    DotsStartAware,
    /// ` N.` becomes `\n\tN.` and ` N)` becomes `\n\t\tN)`.
    DotsAndParens,
}

impl NumberingStyle {
    pub(crate) fn apply(self, line: &str) -> String {
        match self {
            Self::Dots => break_markers(line, false),
            Self::DotsAndParens => break_markers(line, true),
            Self::DotsStartAware => {
                if starts_with_marker(line) {
                    Self::Dots.apply(&format!(" {line}"))
                } else {
                    Self::Dots.apply(line)
                }
            }
        }
    }
}

fn is_marker_digit(ch: char) -> bool {
    ('1'..='9').contains(&ch)
}

fn starts_with_marker(line: &str) -> bool {
    let mut chars = line.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(digit), Some('.')) if is_marker_digit(digit)
    )
}

fn break_markers(line: &str, parens: bool) -> String {
    let chars = line.chars().collect::<Vec<char>>();
    let mut out = String::with_capacity(line.len() + 16);
    let mut index = 0;

    while index < chars.len() {
        let ch = chars[index];
        if ch == ' ' {
            if let (Some(&digit), Some(&closer)) = (chars.get(index + 1), chars.get(index + 2)) {
                let is_dot = closer == '.';
                let is_paren = parens && closer == ')';
                if is_marker_digit(digit) && (is_dot || is_paren) {
                    out.push_str(if is_dot { "\n\t" } else { "\n\t\t" });
                    out.push(digit);
                    out.push(closer);
                    index += 3;
                    continue;
                }
            }
        }
        out.push(ch);
        index += 1;
    }

    out
}
