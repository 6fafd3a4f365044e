//! Hook dispatch: the pre / target / post protocol at every extension
//! point.
//!
//! Each extension point runs the same sequence: meta-pre for every
//! meta-subscribed plugin, then the target hook across the enabled
//! plugins in descending priority order (stopping at the first claiming
//! result for first-responder hooks, visiting everyone for broadcasts),
//! then meta-post with the effective result. Meta hooks fire even when no
//! plugin is enabled for the target, so instrumentation can observe
//! "point reached, nothing attached". Argument lists are rebuilt from the
//! same sources for the post phase and skipped entirely when nobody
//! subscribed to them.

use tracing::{trace, warn};

use crate::hooks::args::{HookArgument, HookArgumentList};
use crate::hooks::types::{
    EventDisposition, FuncResult, HookType, LoadFileOutcome, LoadFileResolution,
};
use crate::manager::{Phase, PluginManager};
use crate::script::{Event, Frame, Func, ObjToken, ValList};

fn call_args<'a>(func: &'a Func, frame: &'a Frame, args: &'a ValList) -> HookArgumentList<'a> {
    vec![
        HookArgument::Func(func),
        HookArgument::Frame(frame),
        HookArgument::ValList(args),
    ]
}

impl PluginManager {
    /// Offer an input file to the plugins enabled for the load-file hook,
    /// in priority order, stopping at the first claiming outcome.
    ///
    /// `ext` is the file's extension without the dot, passed separately
    /// for convenience. An `Unclaimed` resolution means the host performs
    /// its default loading; `FailedBy` means the host must abort loading
    /// this file.
    pub fn dispatch_load_file(&mut self, file: &str, ext: &str) -> LoadFileResolution {
        debug_assert!(
            self.phase() == Phase::ScriptLoading,
            "input files are dispatched between pre- and post-script initialization"
        );
        let meta = self.registry.has_meta_subscribers();
        if meta {
            let args = vec![
                HookArgument::String(file.to_string()),
                HookArgument::String(ext.to_string()),
            ];
            self.run_meta_pre(HookType::LoadFile, &args);
        }

        let mut resolution = LoadFileResolution::Unclaimed;
        for plugin in self.enabled_order(HookType::LoadFile) {
            let Some(slot) = self.slot_mut(&plugin) else {
                continue;
            };
            slot.entry.stats_mut().record_hook();
            match slot.instance.hook_load_file(file, ext) {
                LoadFileOutcome::Loaded => {
                    slot.entry.stats_mut().files_claimed += 1;
                    trace!(plugin = %plugin, file, "input file claimed and loaded");
                    resolution = LoadFileResolution::LoadedBy(plugin);
                    break;
                }
                LoadFileOutcome::Failed => {
                    warn!(plugin = %plugin, file, "input file claimed but failed to load");
                    resolution = LoadFileResolution::FailedBy(plugin);
                    break;
                }
                LoadFileOutcome::NotInterested => {}
            }
        }

        if meta {
            let args = vec![
                HookArgument::String(file.to_string()),
                HookArgument::String(ext.to_string()),
            ];
            self.run_meta_post(HookType::LoadFile, &args, HookArgument::Int(resolution.code()));
        }
        resolution
    }

    /// Offer a function call to the plugins enabled for the call hook, in
    /// priority order, stopping at the first plugin that handles it.
    ///
    /// A handled result carries the owned replacement return value; the
    /// interpreter must use it instead of executing the call. Plugins may
    /// modify `args` in place either way.
    pub fn dispatch_call_function(
        &mut self,
        func: &Func,
        frame: &Frame,
        args: &mut ValList,
    ) -> FuncResult {
        debug_assert!(self.phase() != Phase::Terminated, "dispatch after shutdown");
        let meta = self.registry.has_meta_subscribers();
        if meta {
            let margs = call_args(func, frame, args);
            self.run_meta_pre(HookType::CallFunction, &margs);
        }

        let mut result = FuncResult::Unhandled;
        for plugin in self.enabled_order(HookType::CallFunction) {
            let Some(slot) = self.slot_mut(&plugin) else {
                continue;
            };
            slot.entry.stats_mut().record_hook();
            let outcome = slot.instance.hook_call_function(func, frame, args);
            if outcome.is_handled() {
                slot.entry.stats_mut().calls_intercepted += 1;
                trace!(plugin = %plugin, function = %func, "function call intercepted");
                result = outcome;
                break;
            }
        }

        if meta {
            let margs = call_args(func, frame, args);
            self.run_meta_post(
                HookType::CallFunction,
                &margs,
                HookArgument::FuncResult(result.clone()),
            );
        }
        result
    }

    /// Offer an event about to be queued to the plugins enabled for the
    /// queue hook, in priority order.
    ///
    /// The event moves through the chain: each plugin either claims it
    /// (ownership stays with the plugin, dispatch stops) or hands it
    /// back, possibly modified. Returns `None` if a plugin claimed the
    /// event - the host must not queue it - and the surviving event
    /// otherwise.
    pub fn dispatch_queue_event(&mut self, event: Event) -> Option<Event> {
        debug_assert!(self.phase() != Phase::Terminated, "dispatch after shutdown");
        // Meta hooks need the event after a plugin may have consumed it,
        // so observation works on a snapshot taken up front.
        let meta_snapshot = self
            .registry
            .has_meta_subscribers()
            .then(|| event.clone());
        if let Some(snapshot) = &meta_snapshot {
            let args = vec![HookArgument::Event(snapshot)];
            self.run_meta_pre(HookType::QueueEvent, &args);
        }

        let mut current = Some(event);
        for plugin in self.enabled_order(HookType::QueueEvent) {
            let Some(ev) = current.take() else {
                break;
            };
            let Some(slot) = self.slot_mut(&plugin) else {
                current = Some(ev);
                continue;
            };
            slot.entry.stats_mut().record_hook();
            match slot.instance.hook_queue_event(ev) {
                EventDisposition::Claimed => {
                    slot.entry.stats_mut().events_claimed += 1;
                    trace!(plugin = %plugin, "event claimed");
                }
                EventDisposition::Declined(ev) => current = Some(ev),
            }
        }

        if let Some(snapshot) = &meta_snapshot {
            let shown = current.as_ref().unwrap_or(snapshot);
            let args = vec![HookArgument::Event(shown)];
            self.run_meta_post(
                HookType::QueueEvent,
                &args,
                HookArgument::Bool(current.is_none()),
            );
        }
        current
    }

    /// Notify every plugin enabled for the drain hook that the event
    /// queue is being drained.
    pub fn dispatch_drain_events(&mut self) {
        debug_assert!(self.phase() != Phase::Terminated, "dispatch after shutdown");
        let meta = self.registry.has_meta_subscribers();
        let args: HookArgumentList<'_> = Vec::new();
        if meta {
            self.run_meta_pre(HookType::DrainEvents, &args);
        }

        for plugin in self.enabled_order(HookType::DrainEvents) {
            if let Some(slot) = self.slot_mut(&plugin) {
                slot.entry.stats_mut().record_hook();
                slot.instance.hook_drain_events();
            }
        }

        if meta {
            self.run_meta_post(HookType::DrainEvents, &args, HookArgument::Void);
        }
    }

    /// Notify every plugin enabled for the clock hook that network time
    /// advanced.
    pub fn dispatch_update_network_time(&mut self, network_time: f64) {
        debug_assert!(self.phase() != Phase::Terminated, "dispatch after shutdown");
        let meta = self.registry.has_meta_subscribers();
        let args = vec![HookArgument::Double(network_time)];
        if meta {
            self.run_meta_pre(HookType::UpdateNetworkTime, &args);
        }

        for plugin in self.enabled_order(HookType::UpdateNetworkTime) {
            if let Some(slot) = self.slot_mut(&plugin) {
                slot.entry.stats_mut().record_hook();
                slot.instance.hook_update_network_time(network_time);
            }
        }

        if meta {
            self.run_meta_post(HookType::UpdateNetworkTime, &args, HookArgument::Void);
        }
    }

    /// Notify every plugin enabled for the destructor hook that an object
    /// was destroyed. The token's object is already gone; plugins may
    /// only compare it for identity. Interest in the token is dropped
    /// afterwards.
    pub fn dispatch_obj_destroy(&mut self, obj: ObjToken) {
        let meta = self.registry.has_meta_subscribers();
        let args = vec![HookArgument::Ptr(obj)];
        if meta {
            self.run_meta_pre(HookType::ObjDestroy, &args);
        }

        for plugin in self.enabled_order(HookType::ObjDestroy) {
            if let Some(slot) = self.slot_mut(&plugin) {
                slot.entry.stats_mut().record_hook();
                slot.instance.hook_obj_dtor(obj);
            }
        }

        if meta {
            self.run_meta_post(HookType::ObjDestroy, &args, HookArgument::Void);
        }
        self.forget_obj_dtor(obj);
    }

    fn run_meta_pre(&mut self, hook: HookType, args: &HookArgumentList<'_>) {
        for plugin in self.enabled_order(HookType::MetaPre) {
            if let Some(slot) = self.slot_mut(&plugin) {
                slot.entry.stats_mut().record_meta();
                slot.instance.meta_hook_pre(hook, args);
            }
        }
    }

    fn run_meta_post(
        &mut self,
        hook: HookType,
        args: &HookArgumentList<'_>,
        result: HookArgument<'_>,
    ) {
        for plugin in self.enabled_order(HookType::MetaPost) {
            if let Some(slot) = self.slot_mut(&plugin) {
                slot.entry.stats_mut().record_meta();
                slot.instance.meta_hook_post(hook, args, &result);
            }
        }
    }
}
