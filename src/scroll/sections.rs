//! The section activation state machine. When the reader scrolls quickly the
//! controller replays every activation handler between the last active
//! section and the new one, in order, so no visual state is skipped.

use anyhow::{Context, Result, anyhow, ensure};

use crate::scene::Scene;

pub type ActivateFn = Box<dyn FnMut(&mut Scene, f64) -> Result<()>>;
pub type ProgressFn = Box<dyn FnMut(&mut Scene, f32, f64) -> Result<()>>;

/// Registers handlers per section index. `build` validates that every index
/// up to the highest registered one has an activation handler, so a missing
/// handler is caught at construction instead of mid-scroll.
#[derive(Default)]
pub struct SectionSetBuilder {
    activate: Vec<Option<ActivateFn>>,
    progress: Vec<Option<ProgressFn>>,
}

impl SectionSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_activate(
        mut self,
        index: usize,
        handler: impl FnMut(&mut Scene, f64) -> Result<()> + 'static,
    ) -> Self {
        if self.activate.len() <= index {
            self.activate.resize_with(index + 1, || None);
        }
        self.activate[index] = Some(Box::new(handler));
        self
    }

    /// Progress handlers are optional; a section without one is a no-op
    /// under progress updates, never an error.
    pub fn on_progress(
        mut self,
        index: usize,
        handler: impl FnMut(&mut Scene, f32, f64) -> Result<()> + 'static,
    ) -> Self {
        if self.progress.len() <= index {
            self.progress.resize_with(index + 1, || None);
        }
        self.progress[index] = Some(Box::new(handler));
        self
    }

    pub fn build(mut self) -> Result<SectionSet> {
        ensure!(
            !self.activate.is_empty(),
            "a section set needs at least one section"
        );
        let count = self.activate.len();
        for (index, slot) in self.activate.iter().enumerate() {
            ensure!(
                slot.is_some(),
                "section {index} has no activation handler (declared sections: {count})"
            );
        }
        ensure!(
            self.progress.len() <= count,
            "progress handler registered past the last section (index {})",
            self.progress.len() - 1
        );
        self.progress.resize_with(count, || None);

        Ok(SectionSet {
            activate: self.activate.into_iter().flatten().collect(),
            progress: self.progress,
        })
    }
}

pub struct SectionSet {
    activate: Vec<ActivateFn>,
    progress: Vec<Option<ProgressFn>>,
}

impl std::fmt::Debug for SectionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionSet")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl SectionSet {
    pub fn len(&self) -> usize {
        self.activate.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activate.is_empty()
    }
}

/// Owns the `last_index` / `active_index` pair. -1 is the virtual
/// "nothing activated yet" state; the first `activate(0)` replays from it.
pub struct SectionController {
    sections: SectionSet,
    last_index: isize,
}

impl SectionController {
    pub fn new(sections: SectionSet) -> Self {
        Self {
            sections,
            last_index: -1,
        }
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn last_index(&self) -> isize {
        self.last_index
    }

    /// Transitions to section `index`, invoking the activation handler of
    /// every section between the previous one (exclusive) and `index`
    /// (inclusive), in scroll order, synchronously. Re-activating the
    /// current section is a no-op. An out-of-range index is a configuration
    /// error and fails loudly.
    pub fn activate(&mut self, scene: &mut Scene, index: usize, now: f64) -> Result<()> {
        let count = self.sections.len();
        if index >= count {
            return Err(anyhow!(
                "section index {index} is out of range (declared sections: {count})"
            ));
        }

        let target = index as isize;
        if target == self.last_index {
            return Ok(());
        }
        let direction: isize = if target > self.last_index { 1 } else { -1 };

        let mut current = self.last_index + direction;
        loop {
            let handler = &mut self.sections.activate[current as usize];
            handler(scene, now)
                .with_context(|| format!("activation handler for section {current} failed"))?;
            if current == target {
                break;
            }
            current += direction;
        }

        self.last_index = target;
        Ok(())
    }

    /// Dispatches in-step scroll progress to section `index` directly, with
    /// no replay semantics. Missing progress handlers are registered no-ops.
    pub fn update(&mut self, scene: &mut Scene, index: usize, progress: f32, now: f64) -> Result<()> {
        let count = self.sections.len();
        if index >= count {
            return Err(anyhow!(
                "section index {index} is out of range (declared sections: {count})"
            ));
        }

        if let Some(handler) = &mut self.sections.progress[index] {
            handler(scene, progress.clamp(0.0, 1.0), now)
                .with_context(|| format!("progress handler for section {index} failed"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::scene::Margins;

    fn scene() -> Scene {
        Scene::new(
            100.0,
            100.0,
            Margins {
                top: 0.0,
                left: 0.0,
                bottom: 0.0,
                right: 0.0,
            },
        )
    }

    fn recording_controller(count: usize) -> (SectionController, Rc<RefCell<Vec<usize>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut builder = SectionSetBuilder::new();
        for index in 0..count {
            let calls = Rc::clone(&calls);
            builder = builder.on_activate(index, move |_, _| {
                calls.borrow_mut().push(index);
                Ok(())
            });
        }
        (
            SectionController::new(builder.build().unwrap()),
            calls,
        )
    }

    #[test]
    fn first_activation_replays_from_the_virtual_start() {
        let (mut controller, calls) = recording_controller(4);
        let mut scene = scene();
        controller.activate(&mut scene, 2, 0.0).unwrap();
        assert_eq!(*calls.borrow(), vec![0, 1, 2]);
        assert_eq!(controller.last_index(), 2);
    }

    #[test]
    fn skip_scrolling_down_visits_every_intermediate_section() {
        let (mut controller, calls) = recording_controller(4);
        let mut scene = scene();
        controller.activate(&mut scene, 0, 0.0).unwrap();
        calls.borrow_mut().clear();

        controller.activate(&mut scene, 3, 0.0).unwrap();
        assert_eq!(*calls.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn skip_scrolling_up_replays_in_reverse_order() {
        let (mut controller, calls) = recording_controller(4);
        let mut scene = scene();
        controller.activate(&mut scene, 3, 0.0).unwrap();
        calls.borrow_mut().clear();

        controller.activate(&mut scene, 0, 0.0).unwrap();
        assert_eq!(*calls.borrow(), vec![2, 1, 0]);
    }

    #[test]
    fn reactivating_the_current_section_is_a_no_op() {
        let (mut controller, calls) = recording_controller(4);
        let mut scene = scene();
        controller.activate(&mut scene, 2, 0.0).unwrap();
        calls.borrow_mut().clear();

        controller.activate(&mut scene, 2, 0.0).unwrap();
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn out_of_range_index_fails_loudly_naming_the_index() {
        let (mut controller, _) = recording_controller(3);
        let mut scene = scene();
        let error = controller.activate(&mut scene, 7, 0.0).unwrap_err();
        assert!(error.to_string().contains('7'));
        // The state machine did not move.
        assert_eq!(controller.last_index(), -1);
    }

    #[test]
    fn build_rejects_a_gap_in_the_handler_table() {
        let builder = SectionSetBuilder::new()
            .on_activate(0, |_, _| Ok(()))
            .on_activate(2, |_, _| Ok(()));
        let error = builder.build().unwrap_err();
        assert!(error.to_string().contains("section 1"));
    }

    #[test]
    fn build_rejects_a_progress_handler_past_the_last_section() {
        let builder = SectionSetBuilder::new()
            .on_activate(0, |_, _| Ok(()))
            .on_progress(3, |_, _, _| Ok(()));
        assert!(builder.build().is_err());
    }

    #[test]
    fn progress_dispatches_directly_without_replay() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_in_handler = Rc::clone(&seen);
        let sections = SectionSetBuilder::new()
            .on_activate(0, |_, _| Ok(()))
            .on_activate(1, |_, _| Ok(()))
            .on_progress(1, move |_, progress, _| {
                seen_in_handler.borrow_mut().push(progress);
                Ok(())
            })
            .build()
            .unwrap();
        let mut controller = SectionController::new(sections);
        let mut scene = scene();

        // Section 0 has no progress handler: a registered no-op.
        controller.update(&mut scene, 0, 0.5, 0.0).unwrap();
        controller.update(&mut scene, 1, 0.25, 0.0).unwrap();
        controller.update(&mut scene, 1, 2.0, 0.0).unwrap();
        assert_eq!(*seen.borrow(), vec![0.25, 1.0]);

        assert!(controller.update(&mut scene, 9, 0.0, 0.0).is_err());
    }

    #[test]
    fn handler_errors_propagate_and_freeze_the_state_machine() {
        let sections = SectionSetBuilder::new()
            .on_activate(0, |_, _| Ok(()))
            .on_activate(1, |_, _| Err(anyhow!("empty domain")))
            .build()
            .unwrap();
        let mut controller = SectionController::new(sections);
        let mut scene = scene();

        controller.activate(&mut scene, 0, 0.0).unwrap();
        assert!(controller.activate(&mut scene, 1, 0.0).is_err());
        assert_eq!(controller.last_index(), 0);
    }
}
