use log::info;
use serde::Deserialize;
use tennis_scoreboard::{MatchId, Side, TennisMatch, format_set_results, internal_panic};
use tide::http::Mime;
use tide::{Request, Response, StatusCode};
use tide_jsx::*;
use time::OffsetDateTime;

use crate::persistence::{
    DatabaseReader, DatabaseWriter, FinishedMatchRow, Page,
};
use crate::registry::MatchRegistry;

pub trait SuitableServerState: Sync + Send + Clone + 'static {
    type DB: Sync + Send + DatabaseReader + DatabaseWriter;
    fn db(&self) -> &Self::DB;
    fn registry(&self) -> &MatchRegistry;
    fn matches_page_size(&self) -> u64;
}

#[derive(Deserialize)]
struct MatchesQuery {
    page: Option<u64>,
    filter_by_player_name: Option<String>,
}

#[derive(Deserialize)]
struct NewMatchForm {
    player1_name: String,
    player2_name: String,
}

#[derive(Deserialize)]
struct RecordPointForm {
    player_no: String,
}

// Purely type-level construct to avoid making every handler function generic.
// They are all generic by the virtue of being inside the generic impl.
pub struct Handlers<ST> {
    _phantom: ST,
}

impl<ST: SuitableServerState> Handlers<ST> {
    pub fn register_handlers(app: &mut tide::Server<ST>) {
        app.at("/").get(Self::handle_index);
        app.at("/matches").get(Self::handle_matches);
        app.at("/new-match").get(Self::handle_new_match_form);
        app.at("/new-match").post(Self::handle_new_match);
        app.at("/match-score/:match_id").get(Self::handle_match_score);
        app.at("/match-score/:match_id").post(Self::handle_record_point);

        app.with(tide::log::LogMiddleware::new());

        app.with(tide::utils::After(|mut res: Response| async {
            if let Some(err) = res.error() {
                let msg = format!("Error: {:?}", err);
                res.set_status(err.status());
                res.set_body(msg);
            }
            Ok(res)
        }));
    }

    async fn handle_index(_req: Request<ST>) -> tide::Result {
        let h: String = html! {
            <html>
                <style>
                    {raw!(Self::STYLESHEET)}
                </style>
            <head>
            </head>
            <body>
                <h1>{"Tennis Scoreboard"}</h1>
                <p><a href={"/new-match"}>{"Start a new match"}</a></p>
                <p><a href={"/matches"}>{"Finished matches"}</a></p>
            </body>
            </html>
        };
        Ok(html_response(h))
    }

    async fn handle_matches(req: Request<ST>) -> tide::Result {
        let query: MatchesQuery = req.query()?;
        let page_size = req.state().matches_page_size().max(1);
        let page_no = query.page.unwrap_or(1).max(1);
        let filter = query
            .filter_by_player_name
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty());
        let (matches, total) = req
            .state()
            .db()
            .finished_matches(
                Page { limit: page_size, offset: (page_no - 1) * page_size },
                filter,
            )
            .await
            .map_err(anyhow::Error::from)?;
        let total_pages = total.div_ceil(page_size).max(1);

        let table_body = matches
            .iter()
            .map(|m| {
                let (date, time) = format_timestamp_date_and_time(m.finished_at)
                    .unwrap_or(("-".into(), "-".into()));
                rsx! {<tr>
                    <td>{date}</td>
                    <td class={"centered"}>{time}</td>
                    <td>{m.player1_name.clone()}</td>
                    <td>{m.player2_name.clone()}</td>
                    <td>{m.winner_name.clone()}</td>
                    <td>{format_score_summary(&m.score_summary)}</td>
                </tr>}
            })
            .collect::<Vec<_>>();

        let page_href = |page: u64| {
            let mut query = url::form_urlencoded::Serializer::new(String::new());
            query.append_pair("page", &page.to_string());
            if let Some(f) = filter {
                query.append_pair("filter_by_player_name", f);
            }
            format!("/matches?{}", query.finish())
        };
        let mut pager = String::new();
        if page_no > 1 {
            pager += &format!("<a href=\"{}\">&laquo; prev</a> ", page_href(page_no - 1));
        }
        pager += &format!("Page {page_no} of {total_pages}");
        if page_no < total_pages {
            pager += &format!(" <a href=\"{}\">next &raquo;</a>", page_href(page_no + 1));
        }

        let h: String = html! {
            <html>
                <style>
                    {raw!(Self::STYLESHEET)}
                </style>
            <head>
            </head>
            <body>
              <h2>{"Finished matches"}</h2>
              <form method={"get"} action={"/matches"}>
                <input
                    type={"text"}
                    name={"filter_by_player_name"}
                    placeholder={"Player name"}
                    value={filter.unwrap_or("").to_owned()}
                />
                <button type={"submit"}>{"Filter"}</button>
              </form>
              <table>
                <tr>
                    <th>{"Date"}</th>
                    <th>{"Time (UTC)"}</th>
                    <th>{"Player 1"}</th>
                    <th>{"Player 2"}</th>
                    <th>{"Winner"}</th>
                    <th>{"Score"}</th>
                </tr>
                {table_body}
              </table>
              <p>{raw!(pager.as_str())}</p>
              <p><a href={"/"}>{"Home"}</a></p>
            </body>
            </html>
        };
        Ok(html_response(h))
    }

    async fn handle_new_match_form(_req: Request<ST>) -> tide::Result {
        let h: String = html! {
            <html>
                <style>
                    {raw!(Self::STYLESHEET)}
                </style>
            <head>
            </head>
            <body>
                <h2>{"New match"}</h2>
                <form method={"post"} action={"/new-match"}>
                    <p>
                        <label>{"Player one "}</label>
                        <input type={"text"} name={"player1_name"}/>
                    </p>
                    <p>
                        <label>{"Player two "}</label>
                        <input type={"text"} name={"player2_name"}/>
                    </p>
                    <button type={"submit"}>{"Start match"}</button>
                </form>
            </body>
            </html>
        };
        Ok(html_response(h))
    }

    async fn handle_new_match(mut req: Request<ST>) -> tide::Result {
        let form: NewMatchForm = req.body_form().await?;
        let player1_name = Self::checked_player_name(&form.player1_name)?;
        let player2_name = Self::checked_player_name(&form.player2_name)?;
        if player1_name == player2_name {
            return Err(tide::Error::from_str(
                StatusCode::BadRequest,
                "A match needs two distinct players.",
            ));
        }
        let player_one = req
            .state()
            .db()
            .find_or_create_player(&player1_name)
            .await
            .map_err(anyhow::Error::from)?;
        let player_two = req
            .state()
            .db()
            .find_or_create_player(&player2_name)
            .await
            .map_err(anyhow::Error::from)?;
        let new_match = TennisMatch::new(player_one, player_two);
        let match_id = new_match.id();
        req.state().registry().put(new_match);
        info!("Match {} started: {} vs {}", match_id, player1_name, player2_name);
        Ok(tide::Redirect::see_other(format!("/match-score/{match_id}")).into())
    }

    async fn handle_match_score(req: Request<ST>) -> tide::Result {
        let match_id = Self::parse_match_id(&req)?;
        let Some(tennis_match) = req.state().registry().find(match_id) else {
            return Err(Self::no_such_match(match_id));
        };
        Ok(html_response(Self::score_page(&tennis_match)))
    }

    async fn handle_record_point(mut req: Request<ST>) -> tide::Result {
        let match_id = Self::parse_match_id(&req)?;
        let form: RecordPointForm = req.body_form().await?;
        let winner = match form.player_no.as_str() {
            "1" => Side::One,
            "2" => Side::Two,
            _ => {
                return Err(tide::Error::from_str(
                    StatusCode::BadRequest,
                    "player_no must be \"1\" or \"2\".",
                ));
            }
        };
        // A concurrent request may have finished the match between our update
        // and its finalization; in that case the value is kept as is and the
        // finalization below runs again (it is idempotent).
        let Some(updated) = req.state().registry().update(match_id, |m| {
            if m.is_finished() { m.clone() } else { m.add_point(winner) }
        }) else {
            return Err(Self::no_such_match(match_id));
        };
        if updated.is_finished() {
            Self::finalize_match(&req, &updated).await?;
            Ok(html_response(Self::final_page(&updated)))
        } else {
            Ok(tide::Redirect::see_other(format!("/match-score/{match_id}")).into())
        }
    }

    // Persist first, remove from the registry after. If the insert fails the
    // match stays in the registry, so recording another point retries the
    // finalization instead of losing the result.
    async fn finalize_match(req: &Request<ST>, tennis_match: &TennisMatch) -> tide::Result<()> {
        let winner = tennis_match.winner().unwrap_or_else(|| {
            internal_panic!("match {} finished without a winner", tennis_match.id())
        });
        let row = FinishedMatchRow {
            match_uuid: tennis_match.id().to_string(),
            player1_id: tennis_match.player(Side::One).id.0,
            player2_id: tennis_match.player(Side::Two).id.0,
            winner_id: winner.id.0,
            score_summary: serde_json::to_string(tennis_match.score().final_view())
                .map_err(|err| tide::Error::new(StatusCode::InternalServerError, err))?,
            finished_at: Some(OffsetDateTime::now_utc()),
        };
        req.state()
            .db()
            .add_finished_match(row)
            .await
            .map_err(anyhow::Error::from)?;
        req.state().registry().delete(tennis_match.id());
        info!("Match {} finished, winner: {}", tennis_match.id(), winner.name);
        Ok(())
    }

    fn score_page(tennis_match: &TennisMatch) -> String {
        let view = tennis_match.live_view();
        let score_row = |side: Side| {
            rsx! {<tr>
                <td>{view.player_names[side].clone()}</td>
                <td class={"centered"}>{view.score.sets[side]}</td>
                <td class={"centered"}>{view.score.games[side]}</td>
                <td class={"centered"}>{view.score.points[side].clone()}</td>
            </tr>}
        };
        let score_rows = vec![score_row(Side::One), score_row(Side::Two)];
        let action = format!("/match-score/{}", tennis_match.id());
        let point_button = |side: Side| {
            let player_no = match side {
                Side::One => "1",
                Side::Two => "2",
            };
            rsx! {
                <form method={"post"} action={action.clone()}>
                    <input type={"hidden"} name={"player_no"} value={player_no}/>
                    <button type={"submit"}>
                        {format!("Point for {}", view.player_names[side])}
                    </button>
                </form>
            }
        };
        let point_buttons = vec![point_button(Side::One), point_button(Side::Two)];
        html! {
            <html>
                <style>
                    {raw!(Self::STYLESHEET)}
                </style>
            <head>
            </head>
            <body>
              <h2>{"Current score"}</h2>
              <table>
                <tr>
                    <th>{"Player"}</th>
                    <th>{"Sets"}</th>
                    <th>{"Games"}</th>
                    <th>{"Points"}</th>
                </tr>
                {score_rows}
              </table>
              {point_buttons}
            </body>
            </html>
        }
    }

    fn final_page(tennis_match: &TennisMatch) -> String {
        let winner_name = tennis_match.winner().map_or(String::new(), |w| w.name.clone());
        let set_rows = tennis_match
            .score()
            .final_view()
            .iter()
            .enumerate()
            .map(|(i, set)| {
                rsx! {<tr>
                    <td>{format!("Set {}", i + 1)}</td>
                    <td class={"centered"}>{set.games[Side::One]}</td>
                    <td class={"centered"}>{set.games[Side::Two]}</td>
                    <td class={"centered"}>{set.tie_break.map_or("-".to_owned(), |tb| {
                        format!("{}:{}", tb.points[Side::One], tb.points[Side::Two])
                    })}</td>
                </tr>}
            })
            .collect::<Vec<_>>();
        html! {
            <html>
                <style>
                    {raw!(Self::STYLESHEET)}
                </style>
            <head>
            </head>
            <body>
              <h2>{format!("Match over: {} wins", winner_name)}</h2>
              <table>
                <tr>
                    <th>{"Set"}</th>
                    <th>{tennis_match.player(Side::One).name.clone()}</th>
                    <th>{tennis_match.player(Side::Two).name.clone()}</th>
                    <th>{"Tie-break"}</th>
                </tr>
                {set_rows}
              </table>
              <p><a href={"/matches"}>{"Finished matches"}</a></p>
              <p><a href={"/new-match"}>{"Start a new match"}</a></p>
            </body>
            </html>
        }
    }

    fn parse_match_id(req: &Request<ST>) -> tide::Result<MatchId> {
        req.param("match_id")?
            .parse()
            .map_err(|err| tide::Error::new(StatusCode::BadRequest, err))
    }

    fn no_such_match(match_id: MatchId) -> tide::Error {
        tide::Error::from_str(
            StatusCode::NotFound,
            format!("No ongoing match with id {match_id}."),
        )
    }

    fn checked_player_name(name: &str) -> tide::Result<String> {
        crate::check_player_name::validate_player_name(name)
            .map_err(|err| tide::Error::from_str(StatusCode::BadRequest, err))
    }

    const STYLESHEET: &str = r#"
table, th, td {
    border: 1px solid black;
    border-collapse: collapse;
}
td, th {
    padding-left: 10px;
    padding-right: 10px;
}
td.centered {
    text-align: center;
}
form {
    display: inline-block;
    margin-top: 10px;
    margin-right: 10px;
}
"#;
}

fn html_response(body: String) -> Response {
    let mut resp = Response::new(StatusCode::Ok);
    resp.set_content_type(Mime::from("text/html; charset=UTF-8"));
    resp.set_body(body);
    resp
}

fn format_score_summary(encoded: &str) -> String {
    match serde_json::from_str::<Vec<tennis_scoreboard::SetResult>>(encoded) {
        Ok(results) => format_set_results(&results),
        Err(_) => encoded.to_owned(),
    }
}

fn format_timestamp_date_and_time(maybe_ts: Option<OffsetDateTime>) -> Option<(String, String)> {
    let datetime = maybe_ts?;
    let date = datetime
        .format(&time::macros::format_description!(
            "[year]-[month]-[day], [weekday repr:short]"
        ))
        .ok()?;
    let time = datetime
        .format(&time::macros::format_description!(
            "[hour]:[minute]:[second]"
        ))
        .ok()?;
    Some((date, time))
}
