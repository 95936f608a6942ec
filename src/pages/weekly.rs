use leptos::prelude::*;
use log::info;

use crate::components::routine_graph::{
	Day, GraphEvent, LayoutMode, RoutineGraphCanvas, WeeklyStats,
};
use crate::data::{self, SkinType};
use crate::pages::home::SkinTypePicker;

/// Skin type and picked day, changed together so a day never outlives the
/// week it was picked in.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct WeekSelection {
	skin: SkinType,
	day: Option<Day>,
}

impl WeekSelection {
	fn pick_skin(&mut self, skin: SkinType) {
		if self.skin != skin {
			*self = WeekSelection { skin, day: None };
		}
	}

	fn pick_day(&mut self, day: Day) {
		self.day = Some(day);
	}
}

/// Weekly routine laid out by day and time slot.
#[component]
pub fn Weekly() -> impl IntoView {
	let selection = RwSignal::new(WeekSelection::default());
	let skin = Memo::new(move |_| selection.get().skin);
	let day = Memo::new(move |_| selection.get().day);
	let (exports, set_exports) = signal(0u32);
	let weekly = Memo::new(move |_| data::weekly_graph(skin.get()));
	let graph_data = Signal::derive(move || weekly.get().graph);
	let dataset = Signal::derive(move || format!("weekly_{}", skin.get().key()));
	let stats = move || WeeklyStats::of(&weekly.get());
	let (hovered, set_hovered) = signal(None::<String>);

	let on_event = Callback::new(move |event: GraphEvent| match event {
		GraphEvent::NodeHover(id) => set_hovered.set(id.and_then(|id| {
			weekly
				.get_untracked()
				.graph
				.nodes
				.into_iter()
				.find(|n| n.id == id)
				.map(|n| n.name)
		})),
		GraphEvent::EdgeHover(index) => set_hovered
			.set(index.and_then(|i| data::edge_caption(&weekly.get_untracked().graph, i))),
		GraphEvent::ExportRequest => info!("Export requested for {}", skin.get_untracked().key()),
		GraphEvent::NodeDrag { id, x, y } => info!("Moved {id} to ({x:.1}, {y:.1})"),
		_ => {}
	});

	view! {
		<div class="fullscreen-graph">
			<RoutineGraphCanvas
				data=graph_data
				dataset=dataset
				mode=LayoutMode::WeeklyRadial
				selected_day=day
				export_requests=exports
				on_event=on_event
				fullscreen=true
			/>
			<div class="graph-overlay">
				<h1>"Weekly Routine"</h1>
				<SkinTypePicker
					skin=skin
					on_pick=Callback::new(move |s: SkinType| selection.update(|sel| sel.pick_skin(s)))
				/>
				<div class="days">
					{Day::ALL
						.into_iter()
						.map(|d| {
							view! {
								<button
									class:active=move || day.get() == Some(d)
									on:click=move |_| selection.update(|sel| sel.pick_day(d))
								>
									{d.label()}
								</button>
							}
						})
						.collect_view()}
				</div>
				<dl class="stats">
					<dt>"Products"</dt>
					<dd>{move || stats().total_nodes}</dd>
					<dt>"Conflicts"</dt>
					<dd>{move || stats().conflict_edges}</dd>
					<dt>"Same day"</dt>
					<dd>{move || stats().same_day_edges}</dd>
					<dt>"Adjacent days"</dt>
					<dd>{move || stats().adjacent_day_edges}</dd>
					<dt>"Colours needed"</dt>
					<dd>{move || stats().chromatic_number}</dd>
					<dt>"Solved in"</dt>
					<dd>{move || stats().computation_time}</dd>
				</dl>
				<p class="hovered">{move || hovered.get().unwrap_or_default()}</p>
				<button on:click=move |_| set_exports.update(|n| *n += 1)>"Export"</button>
				<a href="/">"Conflict graph"</a>
			</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn switching_skin_type_clears_the_day() {
		let mut selection = WeekSelection::default();
		selection.pick_day(Day::Wednesday);
		selection.pick_skin(SkinType::Normal);
		assert_eq!(selection.day, Some(Day::Wednesday));

		selection.pick_skin(SkinType::Oily);
		assert_eq!(
			selection,
			WeekSelection {
				skin: SkinType::Oily,
				day: None
			}
		);
		selection.pick_day(Day::Sunday);
		assert_eq!(selection.day, Some(Day::Sunday));
	}
}
