//! Utility functions for rating arithmetic

/// Calculate the absolute difference between two ratings
pub fn rating_difference(rating1: f64, rating2: f64) -> f64 {
    (rating1 - rating2).abs()
}

/// Mean rating of a team
pub fn team_average(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    ratings.iter().map(|r| f64::from(*r)).sum::<f64>() / ratings.len() as f64
}

/// Apply a signed delta and clamp the result to the floor
pub fn apply_with_floor(rating: i32, delta: i32, floor: i32) -> i32 {
    rating.saturating_add(delta).max(floor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_difference() {
        assert_eq!(rating_difference(150.0, 100.0), 50.0);
        assert_eq!(rating_difference(100.0, 150.0), 50.0);
        assert_eq!(rating_difference(100.0, 100.0), 0.0);
    }

    #[test]
    fn test_team_average() {
        assert_eq!(team_average(&[100, 131]), 115.5);
        assert_eq!(team_average(&[]), 0.0);
    }

    #[test]
    fn test_apply_with_floor() {
        assert_eq!(apply_with_floor(100, 17, 5), 117);
        assert_eq!(apply_with_floor(10, -20, 5), 5);
        assert_eq!(apply_with_floor(5, -1, 5), 5);
    }
}
