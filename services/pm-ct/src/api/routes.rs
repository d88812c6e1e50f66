//! 合同路由

use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use common::PagedResult;
use errors::AppResult;

use super::actor::RequestActor;
use super::dto::*;
use crate::application::commands::*;
use crate::application::queries::*;
use crate::application::ServiceHandler;
use crate::domain::dashboard::ContractDashboard;
use crate::domain::entities::{AmendmentRequest, Contract, ContractTerms};
use crate::domain::value_objects::ContractId;

type AppState = Arc<ServiceHandler>;

pub fn routes(handler: Arc<ServiceHandler>) -> Router {
    Router::new()
        .route("/api/contracts", post(create_contract).get(list_contracts))
        .route("/api/contracts/{id}", get(get_contract).put(update_contract))
        .route("/api/contracts/{id}/submit", post(submit_contract))
        .route("/api/contracts/{id}/approve", post(approve_contract))
        .route("/api/contracts/{id}/reject", post(reject_contract))
        .route("/api/contracts/{id}/amendments", post(create_amendment))
        .route("/api/contracts/{id}/renew", post(renew_contract))
        .route("/api/contracts/{id}/terminate", post(terminate_contract))
        .route("/api/contracts/{id}/hold", post(put_on_hold))
        .route("/api/contracts/{id}/resume", post(resume_contract))
        .route("/api/contracts/{id}/dashboard", get(get_dashboard))
        .with_state(handler)
}

// ========== 合同维护 ==========

async fn create_contract(
    State(handler): State<AppState>,
    actor: RequestActor,
    Json(terms): Json<ContractTerms>,
) -> AppResult<(StatusCode, Json<SaveResponse>)> {
    let outcome = handler
        .create_contract(&actor, CreateContractCommand { terms })
        .await?;
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

async fn update_contract(
    State(handler): State<AppState>,
    actor: RequestActor,
    Path(contract_id): Path<ContractId>,
    Json(terms): Json<ContractTerms>,
) -> AppResult<Json<SaveResponse>> {
    let outcome = handler
        .update_contract(&actor, UpdateContractCommand { contract_id, terms })
        .await?;
    Ok(Json(outcome.into()))
}

async fn submit_contract(
    State(handler): State<AppState>,
    actor: RequestActor,
    Path(contract_id): Path<ContractId>,
) -> AppResult<Json<SaveResponse>> {
    let outcome = handler
        .submit_contract(&actor, SubmitContractCommand { contract_id })
        .await?;
    Ok(Json(outcome.into()))
}

async fn approve_contract(
    State(handler): State<AppState>,
    actor: RequestActor,
    Path(contract_id): Path<ContractId>,
) -> AppResult<Json<SaveResponse>> {
    let outcome = handler
        .approve_contract(&actor, ApproveContractCommand { contract_id })
        .await?;
    Ok(Json(outcome.into()))
}

async fn reject_contract(
    State(handler): State<AppState>,
    actor: RequestActor,
    Path(contract_id): Path<ContractId>,
    Json(req): Json<RejectRequest>,
) -> AppResult<Json<SaveResponse>> {
    let outcome = handler
        .reject_contract(
            &actor,
            RejectContractCommand {
                contract_id,
                comments: req.comments,
            },
        )
        .await?;
    Ok(Json(outcome.into()))
}

// ========== 合同操作 ==========

async fn create_amendment(
    State(handler): State<AppState>,
    actor: RequestActor,
    Path(contract_id): Path<ContractId>,
    Json(amendment): Json<AmendmentRequest>,
) -> AppResult<(StatusCode, Json<AmendmentResponse>)> {
    let result = handler
        .create_amendment(&actor, CreateAmendmentCommand { contract_id, amendment })
        .await?;
    Ok((StatusCode::CREATED, Json(result.into())))
}

async fn renew_contract(
    State(handler): State<AppState>,
    actor: RequestActor,
    Path(contract_id): Path<ContractId>,
) -> AppResult<(StatusCode, Json<RenewResponse>)> {
    let renewed_contract_id = handler
        .renew_contract(&actor, RenewContractCommand { contract_id })
        .await?;
    Ok((StatusCode::CREATED, Json(RenewResponse { renewed_contract_id })))
}

async fn terminate_contract(
    State(handler): State<AppState>,
    actor: RequestActor,
    Path(contract_id): Path<ContractId>,
    Json(req): Json<ReasonRequest>,
) -> AppResult<Json<SaveResponse>> {
    let outcome = handler
        .terminate_contract(
            &actor,
            TerminateContractCommand {
                contract_id,
                reason: req.reason,
            },
        )
        .await?;
    Ok(Json(outcome.into()))
}

async fn put_on_hold(
    State(handler): State<AppState>,
    actor: RequestActor,
    Path(contract_id): Path<ContractId>,
    Json(req): Json<ReasonRequest>,
) -> AppResult<Json<SaveResponse>> {
    let outcome = handler
        .put_on_hold(
            &actor,
            PutOnHoldCommand {
                contract_id,
                reason: req.reason,
            },
        )
        .await?;
    Ok(Json(outcome.into()))
}

async fn resume_contract(
    State(handler): State<AppState>,
    actor: RequestActor,
    Path(contract_id): Path<ContractId>,
) -> AppResult<Json<SaveResponse>> {
    let outcome = handler
        .resume_contract(&actor, ResumeContractCommand { contract_id })
        .await?;
    Ok(Json(outcome.into()))
}

// ========== 查询 ==========

async fn get_contract(
    State(handler): State<AppState>,
    Path(contract_id): Path<ContractId>,
) -> AppResult<Json<Contract>> {
    let contract = handler.get_contract(GetContractQuery { contract_id }).await?;
    Ok(Json(contract))
}

async fn list_contracts(
    State(handler): State<AppState>,
    Query(params): Query<ListContractsParams>,
) -> AppResult<Json<PagedResult<Contract>>> {
    let result = handler
        .list_contracts(ListContractsQuery {
            status: params.status,
            pagination: params.pagination(),
        })
        .await?;
    Ok(Json(result))
}

async fn get_dashboard(
    State(handler): State<AppState>,
    Path(contract_id): Path<ContractId>,
) -> AppResult<Json<ContractDashboard>> {
    let dashboard = handler.get_dashboard(GetDashboardQuery { contract_id }).await?;
    Ok(Json(dashboard))
}
