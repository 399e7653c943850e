/// Performance score of a single match.
///
/// Deathless games score `kills + assists` instead of dividing by zero.
pub fn score(kills: u32, deaths: u32, assists: u32) -> f64 {
    let contribution = f64::from(kills) + f64::from(assists);
    match deaths {
        0 => contribution,
        deaths => contribution / f64::from(deaths),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_when_dying() {
        assert_eq!(score(10, 2, 4), 7.0);
        assert_eq!(score(1, 4, 1), 0.5);
        assert_eq!(score(0, 3, 0), 0.0);
    }

    #[test]
    fn deathless_is_plain_sum() {
        assert_eq!(score(5, 0, 2), 7.0);
        assert_eq!(score(0, 0, 0), 0.0);
    }

    #[test]
    fn never_negative() {
        for kills in 0..15 {
            for deaths in 0..15 {
                for assists in 0..15 {
                    assert!(score(kills, deaths, assists) >= 0.0);
                }
            }
        }
    }
}
