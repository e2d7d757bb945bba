/// Engine time in seconds since the viewer was created.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Time(pub f64);

impl Time {
    pub const ZERO: Time = Time(0.0);

    /// The instant `seconds` after `self`.
    pub fn after(self, seconds: f64) -> Self {
        Time(self.0 + seconds)
    }

    /// Whether `deadline` has been reached at this instant.
    pub fn has_reached(self, deadline: Time) -> bool {
        self.0 >= deadline.0
    }

    pub fn seconds_since(self, earlier: Time) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Time;

    #[test]
    fn deadline_reached_inclusive() {
        let start = Time(1.0);
        let deadline = start.after(0.3);
        assert!(!Time(1.29).has_reached(deadline));
        assert!(deadline.has_reached(deadline));
        assert!(Time(2.0).has_reached(deadline));
    }

    #[test]
    fn seconds_since_never_negative() {
        assert_eq!(Time(1.0).seconds_since(Time(2.0)), 0.0);
        assert_eq!(Time(2.5).seconds_since(Time(1.0)), 1.5);
    }
}
