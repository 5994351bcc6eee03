use crate::domain::PaginationSpec;
use crate::error::Result;
use crate::infrastructure::{ControlState, Session};
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Clicks the "reveal more" control until it disappears, stops being
/// clickable, or `max_attempts` clicks have been made. Returns the number of
/// clicks that went through.
///
/// A missing, hidden or disabled control is the normal end of the data, not
/// an error. A control that cannot be inspected or clicked ends expansion
/// with whatever rows are already on the page.
pub async fn expand(session: &mut Session, spec: &PaginationSpec) -> Result<usize> {
    let mut expansions = 0;

    while expansions < spec.max_attempts {
        let state = match session.control_state(&spec.control_selector).await {
            Ok(state) => state,
            Err(e) => {
                warn!("Reveal control check {} failed: {e}", expansions + 1);
                break;
            }
        };

        match state {
            ControlState::Absent => {
                info!("No more rows to reveal after {expansions} expansions");
                break;
            }
            ControlState::Inert => {
                info!("Reveal control hidden or disabled after {expansions} expansions");
                break;
            }
            ControlState::Ready => {}
        }

        if let Err(e) = session.click(&spec.control_selector).await {
            warn!("Reveal click {} failed: {e}", expansions + 1);
            break;
        }
        expansions += 1;
        debug!("Revealed more rows ({expansions}/{})", spec.max_attempts);

        if !spec.settle.is_zero() {
            sleep(spec.settle).await;
        }
    }

    Ok(expansions)
}
