use leptos::prelude::*;
use web_sys::MouseEvent;

use worldview_shared::ResolvedRecord;
use worldview_shared::detail::{
    DegradedDetail, DetailView, FullDetail, MAP_LINK_TEXT, PanelClick, present,
};

use crate::app::Theme;

const LABEL_STYLE: &str = "font-weight: 600; margin-right: 4px;";
const ROW_STYLE: &str = "margin: 6px 0; font-size: 0.9rem; line-height: 1.4;";

/// Modal overlay describing the selected country. Renders nothing without a record.
#[component]
pub fn DetailPanel(
    #[prop(into)] record: Signal<Option<ResolvedRecord>>,
    #[prop(into)] on_close: Callback<()>,
) -> impl IntoView {
    let Theme(theme) = expect_context();

    let detail = Memo::new(move |_| record.with(|r| present(r.as_ref())));

    let click = move |kind: PanelClick| {
        if kind.closes_panel() {
            on_close.run(());
        }
    };

    move || {
        let view = detail.get()?;
        let (panel_bg, panel_fg, muted) = theme
            .get()
            .pick(("#ffffff", "#111827", "#6b7280"), ("#1f2937", "#f3f4f6", "#9ca3af"));
        let body = match view {
            DetailView::Full(full) => full_body(full, muted).into_any(),
            DetailView::Degraded(degraded) => degraded_body(degraded, muted).into_any(),
        };
        Some(view! {
            <div
                class="detail-backdrop"
                style="position: fixed; inset: 0; z-index: 50; display: flex; align-items: center; justify-content: center; background: rgba(0,0,0,0.45);"
                on:click=move |_| click(PanelClick::Backdrop)
            >
                <div
                    class="detail-panel"
                    role="dialog"
                    aria-modal="true"
                    style:background=panel_bg
                    style:color=panel_fg
                    style="position: relative; width: min(420px, 92vw); max-height: 85vh; overflow-y: auto; padding: 20px 22px; border-radius: 10px; box-shadow: 0 10px 30px rgba(0,0,0,0.35);"
                    on:click=move |e: MouseEvent| {
                        e.stop_propagation();
                        click(PanelClick::Body);
                    }
                >
                    <button
                        aria-label="Close popup"
                        style:color=muted
                        style="position: absolute; top: 10px; right: 12px; background: none; border: none; font-size: 1.4rem; line-height: 1; cursor: pointer;"
                        on:click=move |e: MouseEvent| {
                            e.stop_propagation();
                            click(PanelClick::CloseButton);
                        }
                    >
                        {"\u{00D7}"}
                    </button>
                    {body}
                </div>
            </div>
        })
    }
}

fn full_body(detail: FullDetail, muted: &'static str) -> impl IntoView {
    let FullDetail {
        title,
        official_name,
        flag,
        capital,
        population,
        region,
        currency,
        languages,
        area,
        map_link,
    } = detail;

    view! {
        <div>
            {flag.map(|flag| view! {
                <img
                    src=flag.src
                    alt=flag.alt
                    style="width: 96px; height: auto; border-radius: 4px; margin-bottom: 10px; box-shadow: 0 1px 3px rgba(0,0,0,0.3);"
                />
            })}
            <h2 style="margin: 0 0 2px 0; font-size: 1.35rem;">{title}</h2>
            {official_name.map(|name| view! {
                <div style:color=muted style="font-size: 0.85rem; margin-bottom: 10px;">{name}</div>
            })}
            <div style=ROW_STYLE><span style=LABEL_STYLE>"Capital:"</span>{capital}</div>
            <div style=ROW_STYLE><span style=LABEL_STYLE>"Population:"</span>{population}</div>
            <div style=ROW_STYLE><span style=LABEL_STYLE>"Region:"</span>{region}</div>
            {area.map(|area| view! {
                <div style=ROW_STYLE><span style=LABEL_STYLE>"Area:"</span>{area}</div>
            })}
            <div style=ROW_STYLE><span style=LABEL_STYLE>"Currency:"</span>{currency}</div>
            <div style=ROW_STYLE><span style=LABEL_STYLE>"Languages:"</span>{languages}</div>
            {map_link.map(map_anchor)}
        </div>
    }
}

fn degraded_body(detail: DegradedDetail, muted: &'static str) -> impl IntoView {
    view! {
        <div>
            <h2 style="margin: 0 0 8px 0; font-size: 1.35rem;">{detail.title}</h2>
            <p style:color=muted style="font-size: 0.9rem; margin: 0 0 8px 0;">{detail.note}</p>
            {detail.map_link.map(map_anchor)}
        </div>
    }
}

fn map_anchor(href: String) -> impl IntoView {
    view! {
        <a
            href=href
            target="_blank"
            rel="noopener noreferrer"
            style="display: inline-block; margin-top: 10px; font-size: 0.9rem; color: #3b82f6;"
        >
            {MAP_LINK_TEXT}
        </a>
    }
}
