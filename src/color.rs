/// Categorical palette applied when the caller supplies no color of its own.
pub const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Default node color: cycles through [`PALETTE`] by node index.
pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_cycles() {
        assert_eq!(palette_color(0), PALETTE[0]);
        assert_eq!(palette_color(9), PALETTE[9]);
        assert_eq!(palette_color(10), PALETTE[0]);
        assert_eq!(palette_color(23), PALETTE[3]);
    }
}
