//! Maps a scroll offset onto the declared step markers: which step is
//! active, and how far through it the reader has scrolled.

/// Resolves `offset` (pixels scrolled past the activation line) against
/// `step_count` uniform steps of `step_height` pixels. Returns the active
/// step index plus the in-step progress fraction in `[0, 1]`, clamped to
/// the declared steps. `None` when there are no steps to resolve against.
pub fn step_at(offset: f32, step_height: f32, step_count: usize) -> Option<(usize, f32)> {
    if step_count == 0 || step_height <= 0.0 {
        return None;
    }

    let position = (offset / step_height).max(0.0);
    let index = (position.floor() as usize).min(step_count - 1);
    let progress = (position - index as f32).clamp(0.0, 1.0);
    Some((index, progress))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_map_to_step_indices_and_progress() {
        assert_eq!(step_at(0.0, 200.0, 5), Some((0, 0.0)));
        assert_eq!(step_at(100.0, 200.0, 5), Some((0, 0.5)));
        assert_eq!(step_at(200.0, 200.0, 5), Some((1, 0.0)));
        assert_eq!(step_at(450.0, 200.0, 5), Some((2, 0.25)));
    }

    #[test]
    fn offsets_clamp_to_the_declared_steps() {
        // Before the first step.
        assert_eq!(step_at(-50.0, 200.0, 3), Some((0, 0.0)));
        // Past the last step: pinned to it at full progress.
        assert_eq!(step_at(5000.0, 200.0, 3), Some((2, 1.0)));
    }

    #[test]
    fn degenerate_geometry_resolves_to_nothing() {
        assert_eq!(step_at(100.0, 200.0, 0), None);
        assert_eq!(step_at(100.0, 0.0, 3), None);
    }
}
