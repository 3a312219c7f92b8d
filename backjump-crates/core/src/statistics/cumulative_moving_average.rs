use std::fmt::Display;

/// The running mean of all terms added so far.
#[derive(Default, Debug, Copy, Clone)]
pub struct CumulativeMovingAverage {
    sum: u64,
    num_terms: u64,
}

impl CumulativeMovingAverage {
    pub fn add_term(&mut self, new_term: u64) {
        self.sum += new_term;
        self.num_terms += 1;
    }

    pub fn value(&self) -> f64 {
        if self.num_terms > 0 {
            self.sum as f64 / self.num_terms as f64
        } else {
            0.0
        }
    }
}

impl Display for CumulativeMovingAverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::CumulativeMovingAverage;

    #[test]
    fn empty_average_is_zero() {
        assert_eq!(0.0, CumulativeMovingAverage::default().value());
    }

    #[test]
    fn average_of_terms() {
        let mut average = CumulativeMovingAverage::default();
        average.add_term(10);
        assert_eq!(10.0, average.value());
        average.add_term(20);
        assert_eq!(15.0, average.value());
        average.add_term(30);
        assert_eq!(20.0, average.value());
    }
}
