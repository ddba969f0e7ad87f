use std::boxed::Box;
use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::sync::Arc;
use std::vec::Vec;

use async_trait::async_trait;

use crate::api::web::dto::{PaymentResultDto, ShippingAddrDto};
use crate::datastore::{
    AbstInMemoryDStore, AppInMemFetchedSingleRow, AppInMemFetchedSingleTable, AppInMemUpdateData,
};
use crate::error::{AppError, AppErrorCode};
use crate::model::{
    BaseProductIdentity, OrderChargeModel, OrderLineModel, OrderLinePriceModel, OrderModel,
    OrderStatus, PaymentMethod, PaymentResultModel, ShippingAddrModel,
};

use super::super::AbsOrderRepo;
use super::{parse_cell, parse_opt_time_cell, parse_time_cell};

mod _order_toplvl {
    use crate::datastore::AbsDStoreFilterKeyOp;

    pub(super) const TABLE_LABEL: &str = "order_toplvl";

    pub(super) enum InMemColIdx {
        OwnerId,
        Status,
        PaymentMethod,
        ItemsPrice,
        TaxPrice,
        ShippingPrice,
        TotalPrice,
        CreateTime,
        UpdateTime,
        PaidTime,
        DeliveredTime,
        ExpectDelivery,
        PaymentResult,
        ShippingAddr,
        TotNumColumns,
    }
    impl From<InMemColIdx> for usize {
        fn from(value: InMemColIdx) -> usize {
            match value {
                InMemColIdx::OwnerId => 0,
                InMemColIdx::Status => 1,
                InMemColIdx::PaymentMethod => 2,
                InMemColIdx::ItemsPrice => 3,
                InMemColIdx::TaxPrice => 4,
                InMemColIdx::ShippingPrice => 5,
                InMemColIdx::TotalPrice => 6,
                InMemColIdx::CreateTime => 7,
                InMemColIdx::UpdateTime => 8,
                InMemColIdx::PaidTime => 9,
                InMemColIdx::DeliveredTime => 10,
                InMemColIdx::ExpectDelivery => 11,
                InMemColIdx::PaymentResult => 12,
                InMemColIdx::ShippingAddr => 13,
                InMemColIdx::TotNumColumns => 14,
            }
        }
    }

    pub(super) struct OwnerFiltKeyOp {
        pub owner_id: String,
    }
    impl AbsDStoreFilterKeyOp for OwnerFiltKeyOp {
        fn filter(&self, _k: &String, v: &Vec<String>) -> bool {
            let idx: usize = InMemColIdx::OwnerId.into();
            v.get(idx).map(|c| c == &self.owner_id).unwrap_or(false)
        }
    }
    pub(super) struct AllKeyOp;
    impl AbsDStoreFilterKeyOp for AllKeyOp {
        fn filter(&self, _k: &String, _v: &Vec<String>) -> bool {
            true
        }
    }
} // end of inner module _order_toplvl

mod _order_line {
    use crate::datastore::AbsDStoreFilterKeyOp;

    pub(super) const TABLE_LABEL: &str = "order_line";

    pub(super) enum InMemColIdx {
        Quantity,
        UnitPrice,
        TotalPrice,
        Name,
        Image,
        TotNumColumns,
    }
    impl From<InMemColIdx> for usize {
        fn from(value: InMemColIdx) -> usize {
            match value {
                InMemColIdx::Quantity => 0,
                InMemColIdx::UnitPrice => 1,
                InMemColIdx::TotalPrice => 2,
                InMemColIdx::Name => 3,
                InMemColIdx::Image => 4,
                InMemColIdx::TotNumColumns => 5,
            }
        }
    }

    // line keys are `{oid}/{seller-id}/{product-id}`
    pub(super) struct OidPrefixFiltKeyOp {
        pub prefix: String,
    }
    impl AbsDStoreFilterKeyOp for OidPrefixFiltKeyOp {
        fn filter(&self, k: &String, _v: &Vec<String>) -> bool {
            k.starts_with(self.prefix.as_str())
        }
    }
} // end of inner module _order_line

pub struct OrderInMemRepo {
    datastore: Arc<Box<dyn AbstInMemoryDStore>>,
}

impl OrderInMemRepo {
    pub async fn new(m: Arc<Box<dyn AbstInMemoryDStore>>) -> DefaultResult<Self, AppError> {
        m.create_table(_order_toplvl::TABLE_LABEL).await?;
        m.create_table(_order_line::TABLE_LABEL).await?;
        Ok(Self { datastore: m })
    }

    fn toplvl_row(order: &OrderModel) -> AppInMemFetchedSingleRow {
        let mut row = (0.._order_toplvl::InMemColIdx::TotNumColumns.into())
            .map(|_n| String::new())
            .collect::<Vec<String>>();
        let payment_serial = order
            .payment
            .clone()
            .map(|p| {
                let dto = PaymentResultDto::from(p);
                serde_json::to_string(&dto).unwrap_or_default()
            })
            .unwrap_or_default();
        let addr_dto = ShippingAddrDto::from(order.shipping.clone());
        let addr_serial = serde_json::to_string(&addr_dto).unwrap_or_default();
        [
            (
                _order_toplvl::InMemColIdx::OwnerId,
                order.owner_id.to_string(),
            ),
            (
                _order_toplvl::InMemColIdx::Status,
                order.status.as_str().to_string(),
            ),
            (
                _order_toplvl::InMemColIdx::PaymentMethod,
                order.payment_method.as_str().to_string(),
            ),
            (
                _order_toplvl::InMemColIdx::ItemsPrice,
                order.charge.items.to_string(),
            ),
            (
                _order_toplvl::InMemColIdx::TaxPrice,
                order.charge.tax.to_string(),
            ),
            (
                _order_toplvl::InMemColIdx::ShippingPrice,
                order.charge.shipping.to_string(),
            ),
            (
                _order_toplvl::InMemColIdx::TotalPrice,
                order.charge.total.to_string(),
            ),
            (
                _order_toplvl::InMemColIdx::CreateTime,
                order.create_time.to_rfc3339(),
            ),
            (
                _order_toplvl::InMemColIdx::UpdateTime,
                order.update_time.to_rfc3339(),
            ),
            (
                _order_toplvl::InMemColIdx::PaidTime,
                order
                    .paid_time
                    .as_ref()
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default(),
            ),
            (
                _order_toplvl::InMemColIdx::DeliveredTime,
                order
                    .delivered_time
                    .as_ref()
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default(),
            ),
            (
                _order_toplvl::InMemColIdx::ExpectDelivery,
                order
                    .expect_delivery
                    .as_ref()
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default(),
            ),
            (_order_toplvl::InMemColIdx::PaymentResult, payment_serial),
            (_order_toplvl::InMemColIdx::ShippingAddr, addr_serial),
        ]
        .into_iter()
        .map(|(idx, val)| {
            let idx: usize = idx.into();
            row[idx] = val;
        })
        .count();
        row
    } // end of fn toplvl_row

    fn line_rows(order: &OrderModel) -> AppInMemFetchedSingleTable {
        let kv_iter = order.lines.iter().map(|line| {
            let pkey = format!(
                "{}/{}/{}",
                order.id_, line.id_.seller_id, line.id_.product_id
            );
            let mut row = (0.._order_line::InMemColIdx::TotNumColumns.into())
                .map(|_n| String::new())
                .collect::<Vec<String>>();
            [
                (_order_line::InMemColIdx::Quantity, line.qty.to_string()),
                (
                    _order_line::InMemColIdx::UnitPrice,
                    line.price.unit.to_string(),
                ),
                (
                    _order_line::InMemColIdx::TotalPrice,
                    line.price.total.to_string(),
                ),
                (_order_line::InMemColIdx::Name, line.name.clone()),
                (_order_line::InMemColIdx::Image, line.image.clone()),
            ]
            .into_iter()
            .map(|(idx, val)| {
                let idx: usize = idx.into();
                row[idx] = val;
            })
            .count();
            (pkey, row)
        });
        HashMap::from_iter(kv_iter)
    }

    /// both tables an order occupies, for the checkout path which inserts them
    /// together with the stock decrement under a single datastore lock
    pub(super) fn in_mem_order_rows(order: &OrderModel) -> Vec<(String, AppInMemFetchedSingleTable)> {
        let toplvl = HashMap::from([(order.id_.clone(), Self::toplvl_row(order))]);
        vec![
            (_order_toplvl::TABLE_LABEL.to_string(), toplvl),
            (_order_line::TABLE_LABEL.to_string(), Self::line_rows(order)),
        ]
    }

    fn try_into_line(key: &str, row: AppInMemFetchedSingleRow) -> DefaultResult<OrderLineModel, AppError> {
        let id_elms = key.split('/').collect::<Vec<&str>>();
        if id_elms.len() != 3 {
            return Err(AppError {
                code: AppErrorCode::DataCorruption,
                detail: Some(format!("order-line-key, actual:{}", key)),
            });
        }
        let seller_id = parse_cell::<u32>(id_elms[1], "seller-id")?;
        let product_id = parse_cell::<u64>(id_elms[2], "product-id")?;
        let fetch = |idx: _order_line::InMemColIdx| -> &str {
            let idx: usize = idx.into();
            row.get(idx).map(|s| s.as_str()).unwrap_or("")
        };
        Ok(OrderLineModel {
            id_: BaseProductIdentity {
                seller_id,
                product_id,
            },
            qty: parse_cell(fetch(_order_line::InMemColIdx::Quantity), "quantity")?,
            price: OrderLinePriceModel {
                unit: parse_cell(fetch(_order_line::InMemColIdx::UnitPrice), "unit-price")?,
                total: parse_cell(fetch(_order_line::InMemColIdx::TotalPrice), "total-price")?,
            },
            name: fetch(_order_line::InMemColIdx::Name).to_string(),
            image: fetch(_order_line::InMemColIdx::Image).to_string(),
        })
    } // end of fn try_into_line

    fn try_into_order(
        oid: &str,
        toprow: AppInMemFetchedSingleRow,
        line_rows: AppInMemFetchedSingleTable,
    ) -> DefaultResult<OrderModel, AppError> {
        let fetch = |idx: _order_toplvl::InMemColIdx| -> &str {
            let idx: usize = idx.into();
            toprow.get(idx).map(|s| s.as_str()).unwrap_or("")
        };
        let payment_serial = fetch(_order_toplvl::InMemColIdx::PaymentResult);
        let payment = if payment_serial.is_empty() {
            None
        } else {
            let dto =
                serde_json::from_str::<PaymentResultDto>(payment_serial).map_err(|_e| AppError {
                    code: AppErrorCode::DataCorruption,
                    detail: Some("payment-result".to_string()),
                })?;
            Some(PaymentResultModel::from(dto))
        };
        let addr_dto = serde_json::from_str::<ShippingAddrDto>(fetch(
            _order_toplvl::InMemColIdx::ShippingAddr,
        ))
        .map_err(|_e| AppError {
            code: AppErrorCode::DataCorruption,
            detail: Some("shipping-addr".to_string()),
        })?;
        let shipping = ShippingAddrModel {
            full_name: addr_dto.full_name,
            line1: addr_dto.line1,
            line2: addr_dto.line2,
            city: addr_dto.city,
            region: addr_dto.region,
            postal_code: addr_dto.postal_code,
            country: addr_dto.country,
            phone: addr_dto.phone,
        };
        let mut lines = line_rows
            .into_iter()
            .map(|(k, row)| Self::try_into_line(k.as_str(), row))
            .collect::<DefaultResult<Vec<_>, AppError>>()?;
        lines.sort_by(|a, b| {
            (a.id_.seller_id, a.id_.product_id).cmp(&(b.id_.seller_id, b.id_.product_id))
        });
        Ok(OrderModel {
            id_: oid.to_string(),
            owner_id: parse_cell(fetch(_order_toplvl::InMemColIdx::OwnerId), "owner-id")?,
            lines,
            shipping,
            payment_method: PaymentMethod::try_from(fetch(
                _order_toplvl::InMemColIdx::PaymentMethod,
            ))?,
            charge: OrderChargeModel {
                items: parse_cell(fetch(_order_toplvl::InMemColIdx::ItemsPrice), "items-price")?,
                tax: parse_cell(fetch(_order_toplvl::InMemColIdx::TaxPrice), "tax-price")?,
                shipping: parse_cell(
                    fetch(_order_toplvl::InMemColIdx::ShippingPrice),
                    "shipping-price",
                )?,
                total: parse_cell(fetch(_order_toplvl::InMemColIdx::TotalPrice), "total-price")?,
            },
            payment,
            paid_time: parse_opt_time_cell(
                fetch(_order_toplvl::InMemColIdx::PaidTime),
                "paid-time",
            )?,
            delivered_time: parse_opt_time_cell(
                fetch(_order_toplvl::InMemColIdx::DeliveredTime),
                "delivered-time",
            )?,
            status: OrderStatus::try_from(fetch(_order_toplvl::InMemColIdx::Status))?,
            expect_delivery: parse_opt_time_cell(
                fetch(_order_toplvl::InMemColIdx::ExpectDelivery),
                "expect-delivery",
            )?,
            create_time: parse_time_cell(
                fetch(_order_toplvl::InMemColIdx::CreateTime),
                "create-time",
            )?,
            update_time: parse_time_cell(
                fetch(_order_toplvl::InMemColIdx::UpdateTime),
                "update-time",
            )?,
        })
    } // end of fn try_into_order

    async fn fetch_lines_of(
        &self,
        oid: &str,
    ) -> DefaultResult<AppInMemFetchedSingleTable, AppError> {
        let op = _order_line::OidPrefixFiltKeyOp {
            prefix: format!("{}/", oid),
        };
        let keys = self
            .datastore
            .filter_keys(_order_line::TABLE_LABEL.to_string(), &op)
            .await?;
        let info = HashMap::from([(_order_line::TABLE_LABEL.to_string(), keys)]);
        let mut resultset = self.datastore.fetch(info).await?;
        Ok(resultset
            .remove(_order_line::TABLE_LABEL)
            .unwrap_or_default())
    }

    async fn fetch_by_filtered_keys(
        &self,
        oids: Vec<String>,
    ) -> DefaultResult<Vec<OrderModel>, AppError> {
        let info = HashMap::from([(_order_toplvl::TABLE_LABEL.to_string(), oids)]);
        let mut resultset = self.datastore.fetch(info).await?;
        let toprows = resultset
            .remove(_order_toplvl::TABLE_LABEL)
            .unwrap_or_default();
        let mut out = Vec::with_capacity(toprows.len());
        for (oid, toprow) in toprows {
            let line_rows = self.fetch_lines_of(oid.as_str()).await?;
            out.push(Self::try_into_order(oid.as_str(), toprow, line_rows)?);
        }
        out.sort_by(|a, b| b.create_time.cmp(&a.create_time));
        Ok(out)
    }
} // end of impl OrderInMemRepo

#[async_trait]
impl AbsOrderRepo for OrderInMemRepo {
    async fn fetch_by_id(&self, oid: &str) -> DefaultResult<OrderModel, AppError> {
        let info = HashMap::from([(
            _order_toplvl::TABLE_LABEL.to_string(),
            vec![oid.to_string()],
        )]);
        let mut resultset = self.datastore.fetch(info).await?;
        let mut toprows = resultset
            .remove(_order_toplvl::TABLE_LABEL)
            .unwrap_or_default();
        let toprow = toprows.remove(oid).ok_or(AppError {
            code: AppErrorCode::OrderNotExist,
            detail: Some(oid.to_string()),
        })?;
        let line_rows = self.fetch_lines_of(oid).await?;
        Self::try_into_order(oid, toprow, line_rows)
    }

    async fn fetch_by_owner(&self, owner_id: u32) -> DefaultResult<Vec<OrderModel>, AppError> {
        let op = _order_toplvl::OwnerFiltKeyOp {
            owner_id: owner_id.to_string(),
        };
        let oids = self
            .datastore
            .filter_keys(_order_toplvl::TABLE_LABEL.to_string(), &op)
            .await?;
        self.fetch_by_filtered_keys(oids).await
    }

    async fn fetch_by_seller(&self, seller_id: u32) -> DefaultResult<Vec<OrderModel>, AppError> {
        // seller membership lives in order lines, not in the top-level row,
        // filter after loading full models
        let all = self.fetch_all().await?;
        let out = all
            .into_iter()
            .filter(|o| o.contains_seller(seller_id))
            .collect();
        Ok(out)
    }

    async fn fetch_all(&self) -> DefaultResult<Vec<OrderModel>, AppError> {
        let oids = self
            .datastore
            .filter_keys(
                _order_toplvl::TABLE_LABEL.to_string(),
                &_order_toplvl::AllKeyOp,
            )
            .await?;
        self.fetch_by_filtered_keys(oids).await
    }

    async fn save_payment(&self, saved: &OrderModel) -> DefaultResult<(), AppError> {
        self.save_status(saved).await
    }

    async fn save_status(&self, saved: &OrderModel) -> DefaultResult<(), AppError> {
        let toplvl = HashMap::from([(saved.id_.clone(), Self::toplvl_row(saved))]);
        let data: AppInMemUpdateData =
            HashMap::from([(_order_toplvl::TABLE_LABEL.to_string(), toplvl)]);
        let _num_saved = self.datastore.save(data).await?;
        Ok(())
    }

    async fn delete_take(&self, oid: &str) -> DefaultResult<OrderModel, AppError> {
        let line_keys = {
            let op = _order_line::OidPrefixFiltKeyOp {
                prefix: format!("{}/", oid),
            };
            self.datastore
                .filter_keys(_order_line::TABLE_LABEL.to_string(), &op)
                .await?
        };
        let info = HashMap::from([
            (
                _order_toplvl::TABLE_LABEL.to_string(),
                vec![oid.to_string()],
            ),
            (_order_line::TABLE_LABEL.to_string(), line_keys.clone()),
        ]);
        let (mut resultset, d_lock) = self.datastore.fetch_acquire(info).await?;
        let mut toprows = resultset
            .remove(_order_toplvl::TABLE_LABEL)
            .unwrap_or_default();
        let toprow = match toprows.remove(oid) {
            Some(v) => v,
            None => {
                // lock guard drops here, the loser of a concurrent cancel race
                // simply reports the order is gone
                return Err(AppError {
                    code: AppErrorCode::OrderNotExist,
                    detail: Some(oid.to_string()),
                });
            }
        };
        let line_rows = resultset
            .remove(_order_line::TABLE_LABEL)
            .unwrap_or_default();
        let taken = Self::try_into_order(oid, toprow, line_rows)?;
        let removal = HashMap::from([
            (
                _order_toplvl::TABLE_LABEL.to_string(),
                vec![oid.to_string()],
            ),
            (_order_line::TABLE_LABEL.to_string(), line_keys),
        ]);
        let _num = self
            .datastore
            .save_delete_release(HashMap::new(), removal, d_lock)?;
        Ok(taken)
    } // end of fn delete_take
} // end of impl AbsOrderRepo for OrderInMemRepo
