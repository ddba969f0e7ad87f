use std::vec::Vec;

use crate::api::web::dto::{OrderLineCreateErrorDto, OrderLineCreateErrorReason};

use super::{BaseProductIdentity, OrderLineModel};

#[derive(Clone)]
pub struct ProductModel {
    pub id_: BaseProductIdentity,
    pub name: String,
    pub image: String,
    pub price: u32, // minor units
    pub count_in_stock: u32,
}

impl PartialEq for ProductModel {
    fn eq(&self, other: &Self) -> bool {
        self.id_ == other.id_
            && self.price == other.price
            && self.count_in_stock == other.count_in_stock
    }
}

pub struct StockLevelModelSet {
    pub items: Vec<ProductModel>,
}

impl StockLevelModelSet {
    fn find(&self, id_: &BaseProductIdentity) -> Option<&ProductModel> {
        self.items.iter().find(|p| &p.id_ == id_)
    }
    fn find_mut(&mut self, id_: &BaseProductIdentity) -> Option<&mut ProductModel> {
        self.items.iter_mut().find(|p| &p.id_ == id_)
    }

    /// All-or-nothing conditional decrement. Requested quantities are
    /// totalled per product first, so repeated lines naming the same product
    /// count as one demand against the current stock level. The second pass
    /// is a dry run collecting every shortage, nothing is applied unless
    /// every demand can be satisfied in full. The caller holds the datastore
    /// lock across this call, so stock can never be driven below zero by
    /// concurrent checkouts.
    pub fn try_reserve(&mut self, lines: &[OrderLineModel]) -> Vec<OrderLineCreateErrorDto> {
        let mut demands: Vec<(BaseProductIdentity, u64)> = Vec::new();
        lines.iter().for_each(|req| {
            if let Some(d) = demands.iter_mut().find(|(id_, _q)| id_ == &req.id_) {
                d.1 += u64::from(req.qty);
            } else {
                demands.push((req.id_.clone(), u64::from(req.qty)));
            }
        });
        let errors = demands
            .iter()
            .filter_map(|(id_, qty_req)| {
                let mut error = OrderLineCreateErrorDto {
                    seller_id: id_.seller_id,
                    product_id: id_.product_id,
                    reason: OrderLineCreateErrorReason::NotExist,
                    shortage: None,
                };
                let opt_reason = if let Some(p) = self.find(id_) {
                    let available = u64::from(p.count_in_stock);
                    if available >= *qty_req {
                        None
                    } else {
                        let gap = *qty_req - available;
                        error.shortage = Some(u32::try_from(gap).unwrap_or(u32::MAX));
                        if p.count_in_stock == 0 {
                            Some(OrderLineCreateErrorReason::OutOfStock)
                        } else {
                            Some(OrderLineCreateErrorReason::NotEnoughToClaim)
                        }
                    }
                } else {
                    Some(OrderLineCreateErrorReason::NotExist)
                };
                if let Some(r) = opt_reason {
                    error.reason = r;
                    Some(error)
                } else {
                    None
                }
            })
            .collect::<Vec<_>>(); // dry-run
        if errors.is_empty() {
            demands
                .iter()
                .map(|(id_, qty_req)| {
                    let p = self.find_mut(id_).unwrap();
                    // the dry run proved `qty_req` fits in the u32 stock count
                    p.count_in_stock -= *qty_req as u32;
                })
                .count();
        }
        errors
    } // end of fn try_reserve

    /// Compensating increment on cancellation. A product deleted since the
    /// order was placed simply skips the adjustment, the identities skipped
    /// are handed back so the caller can log them.
    pub fn try_return(&mut self, lines: &[OrderLineModel]) -> Vec<BaseProductIdentity> {
        lines
            .iter()
            .filter_map(|req| {
                if let Some(p) = self.find_mut(&req.id_) {
                    p.count_in_stock += req.qty;
                    None
                } else {
                    Some(req.id_.clone())
                }
            })
            .collect()
    }
} // end of impl StockLevelModelSet
